use std::sync::mpsc::Sender;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use notif_core::channel::{ChannelError, HostChannel, MethodCall};
use notif_core::delegate;
use notif_core::publisher::Routing;
use notif_core::response::Interaction;
use notif_core::{LocalNotificationsPlugin, NotificationError};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

/// Holds the single plugin instance the native shell talks to.
#[derive(Default)]
pub struct PluginRegistry {
    plugin: RwLock<Option<Arc<LocalNotificationsPlugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `plugin` unless a different instance is already registered.
    pub fn register(&self, plugin: Arc<LocalNotificationsPlugin>) -> bool {
        let mut guard = self.plugin.write();
        if let Some(existing) = guard.as_ref() {
            if !Arc::ptr_eq(existing, &plugin) {
                tracing::warn!("plugin already registered, keeping existing instance");
                return false;
            }
            return true;
        }
        *guard = Some(plugin);
        true
    }

    pub fn plugin(&self) -> Option<Arc<LocalNotificationsPlugin>> {
        self.plugin.read().clone()
    }

    pub fn resuming_from_background(&self) -> bool {
        self.plugin()
            .map(|plugin| plugin.is_resuming_from_background())
            .unwrap_or(false)
    }

    /// Routes a selection given as `[id, actionId?, payload?]`.
    pub fn handle_select_notification(&self, args: &[Value]) -> Result<Routing> {
        let plugin = self.require_plugin()?;
        let interaction = interaction_from_args(args)?;
        Ok(plugin.delegate().route(interaction))
    }

    /// Decodes a JSON method call from the host, runs it and encodes the
    /// result.
    pub fn handle_method_call(&self, raw: &str) -> Result<String> {
        let plugin = self.require_plugin()?;
        let call: MethodCall = serde_json::from_str(raw).context("failed to decode method call")?;
        let result = plugin
            .handle_method_call(&call)
            .with_context(|| format!("method `{}` failed", call.method))?;
        serde_json::to_string(&result).context("failed to encode method result")
    }

    fn require_plugin(&self) -> Result<Arc<LocalNotificationsPlugin>> {
        self.plugin().ok_or_else(|| anyhow!("no plugin registered"))
    }
}

fn interaction_from_args(args: &[Value]) -> Result<Interaction> {
    let notification_id = args
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| NotificationError::malformed("first argument must be an integer id"))?;
    let action_id = match args.get(1) {
        None | Some(Value::Null) => None,
        Some(Value::String(identifier)) => delegate::action_id(identifier),
        Some(other) => {
            return Err(NotificationError::malformed(format!(
                "action id must be a string or null: {other}"
            ))
            .into())
        }
    };
    let payload = delegate::payload_text(args.get(2));
    Ok(Interaction::new(notification_id, action_id, payload))
}

static REGISTRY: Lazy<PluginRegistry> = Lazy::new(PluginRegistry::new);

pub fn register(plugin: Arc<LocalNotificationsPlugin>) -> bool {
    REGISTRY.register(plugin)
}

pub fn registered_plugin() -> Option<Arc<LocalNotificationsPlugin>> {
    REGISTRY.plugin()
}

pub fn resuming_from_background() -> bool {
    REGISTRY.resuming_from_background()
}

pub fn handle_select_notification(args: &[Value]) -> Result<Routing> {
    REGISTRY.handle_select_notification(args)
}

pub fn handle_method_call(raw: &str) -> Result<String> {
    REGISTRY.handle_method_call(raw)
}

#[no_mangle]
pub extern "C" fn local_notifications_resuming_from_background() -> bool {
    resuming_from_background()
}

/// Host channel that writes each call as one JSON line.
pub struct JsonChannel {
    sender: Mutex<Sender<String>>,
}

impl JsonChannel {
    pub fn new(sender: Sender<String>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl HostChannel for JsonChannel {
    fn invoke(&self, call: &MethodCall) -> Result<(), ChannelError> {
        let line = serde_json::to_string(call).map_err(|err| ChannelError(err.to_string()))?;
        self.sender
            .lock()
            .send(line)
            .map_err(|_| ChannelError("host receiver disconnected".into()))
    }
}
