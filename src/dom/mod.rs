//! Markup parsing into an arena tree.
//!
//! Feed markup is parsed with html5ever, which recovers from malformed input
//! the way a browser does, into a [`Dom`]. Serialization back to the chat
//! platform's markup dialect lives in [`serialize`].

mod arena;
pub mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Dom, Node, NodeData, NodeId};
pub use serialize::{inner_html, outer_html, to_html};
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse markup into a tree.
///
/// Parsing never fails; the entry content ends up under `<body>`, see
/// [`Dom::content_root`].
pub fn parse_html(html: &str) -> Dom {
    let sink = DomSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_dom()
}
