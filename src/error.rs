//! Error types for feedpost operations.

use thiserror::Error;

/// Errors raised by the fallible entry points (configuration, templates,
/// probe construction). The rendering pipeline itself never returns these;
/// it downgrades them to [`Diagnostic`]s.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("probe setup failed: {0}")]
    Probe(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A recoverable problem noticed while rendering one entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Template expansion failed; no units were produced.
    #[error("template expansion failed: {0}")]
    Template(String),

    /// A media element had no usable source URL and was skipped.
    #[error("<{tag}> without a source was skipped")]
    MissingMediaSource { tag: String },

    /// The downloadability probe failed; the video was treated as not
    /// downloadable.
    #[error("could not probe {url}: {reason}")]
    ProbeFailed { url: String, reason: String },
}
