//! Rendering configuration.
//!
//! Everything the pipeline needs besides the entry itself: whitelist, size
//! ceilings, marker, labels and delivery flags. Every field has a default,
//! so an empty TOML document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{MediaMessage, ParseMode, TextMessage, UnitKind};
use crate::policy::Whitelist;
use crate::summarize::DEFAULT_MARKER;

/// Per-unit-type length ceilings, in characters of serialized markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LengthLimits {
    pub text: usize,
    pub photo_caption: usize,
    pub video_caption: usize,
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            text: TextMessage::MAX_LENGTH,
            photo_caption: MediaMessage::MAX_CAPTION_LENGTH,
            video_caption: MediaMessage::MAX_CAPTION_LENGTH,
        }
    }
}

impl LengthLimits {
    pub fn for_kind(&self, kind: UnitKind) -> usize {
        match kind {
            UnitKind::Text => self.text,
            UnitKind::Photo => self.photo_caption,
            UnitKind::Video => self.video_caption,
        }
    }
}

/// Button and placeholder texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub read_more: String,
    pub open_image_link: String,
    pub open_video_link: String,
    pub video_not_downloadable: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            read_more: "Read more".into(),
            open_image_link: "Open image link".into(),
            open_video_link: "Open video link".into(),
            video_not_downloadable: "Video is not downloadable".into(),
        }
    }
}

/// When the trailing "read more" button is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMore {
    /// On every rendered entry that has a link.
    #[default]
    Always,
    /// Only when some content was truncated.
    WhenTruncated,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub whitelist: Whitelist,
    pub limits: LengthLimits,
    /// Suffix appended to truncated content.
    pub marker: String,
    pub parse_mode: ParseMode,
    pub disable_notification: bool,
    pub disable_web_page_preview: bool,
    /// Emit nothing after the first truncated segment.
    pub stop_after_truncation: bool,
    pub read_more: ReadMore,
    pub labels: Labels,
    /// Timeout for the video downloadability probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Tera template expanded with entry fields instead of the raw content.
    pub template: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            whitelist: Whitelist::telegram(),
            limits: LengthLimits::default(),
            marker: DEFAULT_MARKER.to_string(),
            parse_mode: ParseMode::Html,
            disable_notification: false,
            disable_web_page_preview: false,
            stop_after_truncation: true,
            read_more: ReadMore::Always,
            labels: Labels::default(),
            probe_timeout_secs: 5,
            template: None,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
