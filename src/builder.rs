//! Message assembly.
//!
//! Turns split pieces into message units. The text before the first media
//! element becomes a standalone text unit; every later text segment becomes
//! the caption of the media unit right before it. Each segment is summarized
//! against the ceiling of the unit it lands in.
//!
//! Videos are probed for downloadability only when they are about to become
//! a unit, so nothing after a closing truncation triggers a request.

use tracing::{debug, warn};

use crate::config::{ReadMore, RenderConfig};
use crate::dom::Dom;
use crate::error::Diagnostic;
use crate::message::{LinkButton, MediaMessage, MessageUnit, TextMessage};
use crate::probe::DownloadProbe;
use crate::split::{MediaKind, MediaReference, Piece, TextSegment};
use crate::summarize::Summarizer;

pub struct MessageBuilder<'c> {
    config: &'c RenderConfig,
    probe: &'c dyn DownloadProbe,
    summarizer: Summarizer<'c>,
    units: Vec<MessageUnit>,
    diagnostics: Vec<Diagnostic>,
    seen_media: bool,
    truncated: bool,
    closed: bool,
}

impl<'c> MessageBuilder<'c> {
    pub fn new(config: &'c RenderConfig, probe: &'c dyn DownloadProbe) -> Self {
        Self {
            config,
            probe,
            summarizer: Summarizer::new(&config.marker),
            units: Vec::new(),
            diagnostics: Vec::new(),
            seen_media: false,
            truncated: false,
            closed: false,
        }
    }

    /// Hand over the problems noticed so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Whether any segment has been cut so far.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn units(&self) -> &[MessageUnit] {
        &self.units
    }

    pub fn push(&mut self, piece: Piece) {
        if self.closed {
            return;
        }
        match piece {
            Piece::Text(segment) => self.push_text(segment),
            Piece::Media(media) => self.push_media(media),
        }
    }

    pub fn extend(&mut self, pieces: impl IntoIterator<Item = Piece>) {
        for piece in pieces {
            self.push(piece);
        }
    }

    fn push_text(&mut self, segment: TextSegment) {
        if segment.is_blank() {
            return;
        }

        let attach_to = if self.seen_media {
            self.units.last_mut()
        } else {
            None
        };

        let truncated = match attach_to {
            Some(unit) => {
                let max = self.config.limits.for_kind(unit.kind());
                let summary = self.summarizer.summarize(segment.dom(), max);
                unit.set_body(summary.html);
                summary.truncated
            }
            None => {
                let summary = self
                    .summarizer
                    .summarize(segment.dom(), self.config.limits.text);
                let text = self.text_message(summary.html);
                self.units.push(MessageUnit::Text(text));
                summary.truncated
            }
        };

        if truncated {
            self.truncated = true;
            if self.config.stop_after_truncation {
                debug!(units = self.units.len(), "content truncated, closing entry");
                self.closed = true;
            }
        }
    }

    fn push_media(&mut self, media: MediaReference) {
        self.seen_media = true;
        let labels = &self.config.labels;
        let unit = match media.kind {
            MediaKind::Image => {
                let mut unit = MessageUnit::Photo(self.media_message(media.src));
                if let Some(link) = media.link {
                    unit.push_row(vec![LinkButton::new(&labels.open_image_link, link)]);
                }
                unit
            }
            MediaKind::Video if self.is_downloadable(&media.src) => {
                let mut unit = MessageUnit::Video(self.media_message(media.src));
                if let Some(link) = media.link {
                    unit.push_row(vec![LinkButton::new(&labels.open_video_link, link)]);
                }
                unit
            }
            MediaKind::Video => {
                let body = self.plain_text_body(&labels.video_not_downloadable);
                let mut unit = MessageUnit::Text(self.text_message(body));
                unit.push_row(vec![LinkButton::new(&labels.open_video_link, media.src)]);
                unit
            }
        };
        self.units.push(unit);
    }

    /// Ask the probe; any failure counts as not downloadable.
    fn is_downloadable(&mut self, url: &str) -> bool {
        match self.probe.is_downloadable(url) {
            Ok(downloadable) => downloadable,
            Err(e) => {
                warn!(url, error = %e, "video probe failed, linking instead");
                self.diagnostics.push(Diagnostic::ProbeFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Escaped and bounded markup for a configured plain-text label.
    fn plain_text_body(&self, text: &str) -> String {
        let mut dom = Dom::new();
        let root = dom.root();
        dom.append_text(root, text);
        self.summarizer.summarize(&dom, self.config.limits.text).html
    }

    /// Attach the trailing "read more" row and hand over the units.
    pub fn finish(mut self, link: Option<&str>) -> Vec<MessageUnit> {
        let wanted = match self.config.read_more {
            ReadMore::Always => true,
            ReadMore::WhenTruncated => self.truncated,
            ReadMore::Never => false,
        };
        if wanted
            && let Some(link) = link
            && let Some(last) = self.units.last_mut()
        {
            last.push_row(vec![LinkButton::new(&self.config.labels.read_more, link)]);
        }
        self.units
    }

    fn text_message(&self, text: String) -> TextMessage {
        TextMessage {
            text,
            parse_mode: self.config.parse_mode,
            keyboard: None,
            disable_notification: self.config.disable_notification,
            disable_web_page_preview: self.config.disable_web_page_preview,
        }
    }

    fn media_message(&self, url: String) -> MediaMessage {
        MediaMessage {
            url,
            caption: None,
            parse_mode: self.config.parse_mode,
            keyboard: None,
            disable_notification: self.config.disable_notification,
        }
    }
}
