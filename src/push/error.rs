// Push Subscription Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PushError>;

/// Errors from the push channel and subscription persistence
#[derive(Error, Debug)]
pub enum PushError {
    #[error("push is not supported in this environment")]
    Unsupported,

    #[error("notification permission denied")]
    PermissionDenied,

    #[error("notification permission was not granted")]
    PermissionNotGranted,

    #[error("push channel error: {reason}")]
    Channel { reason: String },

    #[error("interception layer did not become ready: {reason}")]
    NotReady { reason: String },

    #[error("subscription store error: {reason}")]
    Store { reason: String },

    #[error("preferences store error: {reason}")]
    Preferences { reason: String },
}

impl PushError {
    pub fn channel(reason: impl Into<String>) -> Self {
        Self::Channel {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }
}
