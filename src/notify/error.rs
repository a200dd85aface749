// Notification Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors from displaying notifications and routing clicks
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to display notification: {reason}")]
    Display { reason: String },

    #[error("window operation failed: {reason}")]
    Windows { reason: String },
}

impl NotifyError {
    pub fn display(reason: impl Into<String>) -> Self {
        Self::Display {
            reason: reason.into(),
        }
    }

    pub fn windows(reason: impl Into<String>) -> Self {
        Self::Windows {
            reason: reason.into(),
        }
    }
}
