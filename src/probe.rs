//! Video downloadability probe.
//!
//! Chat platforms can only embed a video they can fetch as a file. Before a
//! video becomes a video unit, its URL is checked with a header-only request:
//! a `Content-Disposition: attachment` response means the file is
//! downloadable. Anything else, including timeouts and errors, counts as not
//! downloadable.

use thiserror::Error;

/// Why a probe could not give an answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Answers whether a media URL can be fetched as an attachment.
pub trait DownloadProbe {
    fn is_downloadable(&self, url: &str) -> Result<bool, ProbeError>;
}

impl<F> DownloadProbe for F
where
    F: Fn(&str) -> Result<bool, ProbeError>,
{
    fn is_downloadable(&self, url: &str) -> Result<bool, ProbeError> {
        self(url)
    }
}

/// Offline probe: every video is linked rather than embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverDownloadable;

impl DownloadProbe for NeverDownloadable {
    fn is_downloadable(&self, _url: &str) -> Result<bool, ProbeError> {
        Ok(false)
    }
}

/// Whether a `Content-Disposition` value marks an attachment.
pub fn is_attachment(content_disposition: Option<&str>) -> bool {
    content_disposition
        .and_then(|value| value.split(';').next())
        .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("attachment"))
}

#[cfg(feature = "http")]
pub use http::HttpProbe;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use reqwest::header::CONTENT_DISPOSITION;
    use tracing::debug;

    use super::{DownloadProbe, ProbeError, is_attachment};
    use crate::error::{Error, Result};

    /// `HEAD` request probe with a hard timeout.
    #[derive(Debug, Clone)]
    pub struct HttpProbe {
        client: Client,
    }

    impl HttpProbe {
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::Probe(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl DownloadProbe for HttpProbe {
        fn is_downloadable(&self, url: &str) -> std::result::Result<bool, ProbeError> {
            let response = self.client.head(url).send().map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Request(e.to_string())
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProbeError::Status(status.as_u16()));
            }

            let disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok());
            let downloadable = is_attachment(disposition);
            debug!(url, downloadable, "probed video");
            Ok(downloadable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_attachment() {
        assert!(is_attachment(Some("attachment")));
        assert!(is_attachment(Some("Attachment; filename=\"clip.mp4\"")));
        assert!(!is_attachment(Some("inline")));
        assert!(!is_attachment(Some("inline; filename=\"attachment.mp4\"")));
        assert!(!is_attachment(None));
    }

    #[test]
    fn test_closure_probe() {
        let probe = |url: &str| -> Result<bool, ProbeError> { Ok(url.ends_with(".mp4")) };
        assert_eq!(probe.is_downloadable("https://x.test/a.mp4"), Ok(true));
        assert_eq!(probe.is_downloadable("https://x.test/a"), Ok(false));
    }

    #[test]
    fn test_never_downloadable() {
        assert_eq!(NeverDownloadable.is_downloadable("https://x.test/a.mp4"), Ok(false));
    }
}
