use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The OS handed over a descriptor that is missing required fields.
    #[error("malformed notification event: {reason}")]
    MalformedEvent { reason: String },
    /// The host channel rejected a response; the response stays queued.
    #[error("failed to deliver notification {notification_id} to host: {reason}")]
    DeliveryFailure { notification_id: i64, reason: String },
    #[error("invalid arguments for `{method}`: {reason}")]
    InvalidArguments { method: String, reason: String },
    #[error("unknown method `{0}`")]
    UnknownMethod(String),
    #[error("scheduler error: {0}")]
    Scheduler(String),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl NotificationError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }

    pub fn invalid_arguments(method: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotificationError>;
