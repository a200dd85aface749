// Worker Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkerError>;

/// Errors produced by the cache store, fetch interceptor, and lifecycle
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("network fetch failed for {url}: {reason}")]
    NetworkFailure { url: String, reason: String },

    #[error("cache storage error: {reason}")]
    CacheStorage { reason: String },

    #[error("cache quota exceeded in \"{cache}\"")]
    QuotaExceeded { cache: String },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("notification error: {0}")]
    Notification(#[from] crate::notify::NotifyError),
}

impl WorkerError {
    /// Create a network failure error
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NetworkFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache storage error
    pub fn cache(reason: impl Into<String>) -> Self {
        Self::CacheStorage {
            reason: reason.into(),
        }
    }
}
