//! Message units handed to the delivery layer.

use serde::{Deserialize, Serialize};

/// How the platform should interpret unit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    #[serde(rename = "Markdown")]
    Markdown,
}

/// Inline button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// One row of inline buttons.
pub type ButtonRow = Vec<LinkButton>;

/// A standalone text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub text: String,
    pub parse_mode: ParseMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Vec<ButtonRow>>,
    #[serde(default)]
    pub disable_notification: bool,
    #[serde(default)]
    pub disable_web_page_preview: bool,
}

impl TextMessage {
    pub const MAX_LENGTH: usize = 4096;

    pub fn new(text: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            text: text.into(),
            parse_mode,
            keyboard: None,
            disable_notification: false,
            disable_web_page_preview: false,
        }
    }
}

/// A photo or video message with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMessage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub parse_mode: ParseMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Vec<ButtonRow>>,
    #[serde(default)]
    pub disable_notification: bool,
}

impl MediaMessage {
    pub const MAX_CAPTION_LENGTH: usize = 200;

    pub fn new(url: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            url: url.into(),
            caption: None,
            parse_mode,
            keyboard: None,
            disable_notification: false,
        }
    }
}

/// Which kind of unit, for picking a length ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Text,
    Photo,
    Video,
}

/// A deliverable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageUnit {
    Text(TextMessage),
    Photo(MediaMessage),
    Video(MediaMessage),
}

impl MessageUnit {
    pub fn kind(&self) -> UnitKind {
        match self {
            MessageUnit::Text(_) => UnitKind::Text,
            MessageUnit::Photo(_) => UnitKind::Photo,
            MessageUnit::Video(_) => UnitKind::Video,
        }
    }

    /// Text for text units, caption for media units.
    pub fn body(&self) -> Option<&str> {
        match self {
            MessageUnit::Text(m) => Some(&m.text),
            MessageUnit::Photo(m) | MessageUnit::Video(m) => m.caption.as_deref(),
        }
    }

    pub fn set_body(&mut self, body: String) {
        match self {
            MessageUnit::Text(m) => m.text = body,
            MessageUnit::Photo(m) | MessageUnit::Video(m) => m.caption = Some(body),
        }
    }

    pub fn keyboard(&self) -> Option<&[ButtonRow]> {
        match self {
            MessageUnit::Text(m) => m.keyboard.as_deref(),
            MessageUnit::Photo(m) | MessageUnit::Video(m) => m.keyboard.as_deref(),
        }
    }

    fn keyboard_slot(&mut self) -> &mut Option<Vec<ButtonRow>> {
        match self {
            MessageUnit::Text(m) => &mut m.keyboard,
            MessageUnit::Photo(m) | MessageUnit::Video(m) => &mut m.keyboard,
        }
    }

    /// Add a button row below any existing rows.
    pub fn push_row(&mut self, row: ButtonRow) {
        self.keyboard_slot().get_or_insert_with(Vec::new).push(row);
    }

    pub fn disable_notification(&self) -> bool {
        match self {
            MessageUnit::Text(m) => m.disable_notification,
            MessageUnit::Photo(m) | MessageUnit::Video(m) => m.disable_notification,
        }
    }
}
