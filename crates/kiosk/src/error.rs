use signage_core::FeedError;
use thiserror::Error;

/// Why a proxy request produced no usable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("JSONP load failed: {0}")]
    Jsonp(String),

    /// The proxy answered with `ok: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("response is missing `{0}`")]
    Missing(&'static str),

    #[error("invalid proxy url: {0}")]
    InvalidUrl(String),
}

impl FeedError for FetchError {
    fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Missing(_))
    }
}
