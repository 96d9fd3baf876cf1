//! Feed entry record handed over by the feed-parsing layer.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::dom::serialize::escape_text;

/// One content body of an entry, with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryContent {
    pub media_type: String,
    pub value: String,
}

/// A syndicated item to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub contents: Vec<EntryContent>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_content(mut self, media_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.contents.push(EntryContent {
            media_type: media_type.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// The markup to render: the first HTML content, else the first plain
    /// text content (escaped), else the summary.
    pub fn body_markup(&self) -> Cow<'_, str> {
        let by_type = |wanted: &str| {
            self.contents
                .iter()
                .find(|c| c.media_type.eq_ignore_ascii_case(wanted))
        };

        if let Some(html) = by_type("text/html").or_else(|| by_type("application/xhtml+xml")) {
            return Cow::Borrowed(&html.value);
        }
        if let Some(plain) = by_type("text/plain") {
            return Cow::Owned(escape_text(&plain.value));
        }
        self.summary
            .as_deref()
            .map(Cow::Borrowed)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_html_content() {
        let entry = FeedEntry::new("t")
            .with_content("text/plain", "plain")
            .with_content("text/html", "<b>rich</b>")
            .with_summary("summary");
        assert_eq!(entry.body_markup(), "<b>rich</b>");
    }

    #[test]
    fn test_plain_content_is_escaped() {
        let entry = FeedEntry::new("t").with_content("text/plain", "a <b> & c");
        assert_eq!(entry.body_markup(), "a &lt;b&gt; &amp; c");
    }

    #[test]
    fn test_falls_back_to_summary() {
        let entry = FeedEntry::new("t").with_summary("<i>short</i>");
        assert_eq!(entry.body_markup(), "<i>short</i>");
        assert_eq!(FeedEntry::new("t").body_markup(), "");
    }
}
