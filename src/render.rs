//! The rendering pipeline.
//!
//! ```text
//! entry markup -> template -> sanitize -> split -> build -> message units
//! ```
//!
//! Rendering never fails. Recoverable problems are reported as
//! [`Diagnostic`]s next to whatever units could be produced.

use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::builder::MessageBuilder;
use crate::config::RenderConfig;
use crate::entry::FeedEntry;
use crate::error::Diagnostic;
use crate::message::MessageUnit;
use crate::probe::DownloadProbe;
use crate::sanitize::Sanitizer;
use crate::split::Splitter;
use crate::template;

/// Result of rendering one entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rendering {
    pub units: Vec<MessageUnit>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any segment was cut to fit its unit.
    pub truncated: bool,
}

impl Rendering {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

pub struct Renderer<'a> {
    config: &'a RenderConfig,
    probe: &'a dyn DownloadProbe,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a RenderConfig, probe: &'a dyn DownloadProbe) -> Self {
        Self { config, probe }
    }

    /// Render a feed entry.
    ///
    /// With a template configured the entry's fields are expanded through it
    /// first; a failing template yields no units and a diagnostic.
    pub fn render_entry(&self, entry: &FeedEntry) -> Rendering {
        let _span = info_span!("render_entry", title = %entry.title).entered();

        let markup = match &self.config.template {
            Some(tpl) => match template::expand(tpl, entry) {
                Ok(markup) => markup,
                Err(e) => {
                    warn!("template expansion failed: {e}");
                    return Rendering {
                        diagnostics: vec![Diagnostic::Template(e.to_string())],
                        ..Default::default()
                    };
                }
            },
            None => entry.body_markup().into_owned(),
        };

        self.render_markup(&markup, entry.link.as_deref())
    }

    /// Render raw markup. `link` is the target of the trailing "read more"
    /// button.
    pub fn render_markup(&self, markup: &str, link: Option<&str>) -> Rendering {
        let mut diagnostics = Vec::new();

        let sanitized = Sanitizer::new(&self.config.whitelist).sanitize_html(markup);
        let pieces = Splitter::new().split(&sanitized, &mut diagnostics);

        let mut builder = MessageBuilder::new(self.config, self.probe);
        builder.extend(pieces);
        diagnostics.extend(builder.take_diagnostics());
        let truncated = builder.truncated();
        let units = builder.finish(link);
        debug!(units = units.len(), truncated, "built message units");

        Rendering {
            units,
            diagnostics,
            truncated,
        }
    }
}

/// Render `markup` with `config`, probing videos with `probe`.
pub fn render(
    markup: &str,
    link: Option<&str>,
    config: &RenderConfig,
    probe: &dyn DownloadProbe,
) -> Rendering {
    Renderer::new(config, probe).render_markup(markup, link)
}
