use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Method the host receives once per selected notification.
pub const SELECT_NOTIFICATION: &str = "selectNotification";

/// A named call crossing the host message channel, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("host channel error: {0}")]
pub struct ChannelError(pub String);

/// Transport into the host application's logic layer.
///
/// `invoke` runs while the publisher holds its lock, so implementations must
/// not call back into the publisher's mutating operations.
pub trait HostChannel: Send + Sync {
    fn invoke(&self, call: &MethodCall) -> Result<(), ChannelError>;
}
