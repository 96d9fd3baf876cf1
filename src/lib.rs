//! # feedpost
//!
//! Renders syndicated feed entries into chat message units.
//!
//! Entry markup goes through a fixed pipeline:
//!
//! 1. **Sanitize**: every element not on the [`Whitelist`] is unwrapped and
//!    attributes are filtered by the tag's [`AttrPolicy`].
//! 2. **Split**: `img` and `video` elements cut the tree into text segments
//!    and [`MediaReference`]s.
//! 3. **Build**: text before the first media becomes a text unit, later text
//!    becomes captions, and every body is summarized to the unit's ceiling.
//!
//! ## Quick Start
//!
//! ```
//! use feedpost::{NeverDownloadable, RenderConfig, render};
//!
//! let config = RenderConfig::default();
//! let out = render(
//!     "<p>Hello <span>world</span></p><img src=\"cat.png\"><p>A cat</p>",
//!     Some("https://blog.test/post"),
//!     &config,
//!     &NeverDownloadable,
//! );
//!
//! assert_eq!(out.units.len(), 2);
//! assert_eq!(out.units[0].body(), Some("Hello world"));
//! assert_eq!(out.units[1].body(), Some("A cat"));
//! ```

pub mod builder;
pub mod config;
pub mod dom;
pub mod entry;
pub mod error;
pub mod message;
pub mod policy;
pub mod probe;
pub mod render;
pub mod sanitize;
pub mod split;
pub mod summarize;
pub mod template;
pub mod util;

pub use builder::MessageBuilder;
pub use config::{Labels, LengthLimits, ReadMore, RenderConfig};
pub use entry::{EntryContent, FeedEntry};
pub use error::{Diagnostic, Error, Result};
pub use message::{
    ButtonRow, LinkButton, MediaMessage, MessageUnit, ParseMode, TextMessage, UnitKind,
};
pub use policy::{AttrPolicy, Whitelist};
#[cfg(feature = "http")]
pub use probe::HttpProbe;
pub use probe::{DownloadProbe, NeverDownloadable, ProbeError};
pub use render::{Renderer, Rendering, render};
pub use sanitize::Sanitizer;
pub use split::{MediaKind, MediaReference, Piece, Splitter, TextSegment};
pub use summarize::{Summarizer, Summary};
pub use util::decode_text;
