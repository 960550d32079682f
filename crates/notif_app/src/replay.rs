use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use anyhow::{Context, Result};
use notif_bridge::JsonChannel;
use notif_core::channel::MethodCall;
use notif_core::config::PluginConfig;
use notif_core::delegate::{NotificationCenterDelegate, RawResponse};
use notif_core::presentation::{PresentationCompletion, PresentedNotification, ResponseCompletion};
use notif_core::scheduling::{
    NotificationChannelSettings, NotificationRequest, NotificationScheduler,
};
use notif_core::LocalNotificationsPlugin;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct ReplayConfig {
    pub script: PathBuf,
    pub plugin: PluginConfig,
}

impl ReplayConfig {
    /// Script path comes from the first CLI argument, falling back to
    /// `NOTIF_REPLAY_SCRIPT`.
    pub fn from_env() -> Result<Self> {
        let script = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("NOTIF_REPLAY_SCRIPT").map(PathBuf::from))
            .context("usage: notif_replay <script.json> (or set NOTIF_REPLAY_SCRIPT)")?;
        Ok(Self {
            script,
            plugin: PluginConfig::from_env(),
        })
    }
}

/// One scripted stimulus: an OS callback, a host readiness signal or a host
/// method call.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ReplayStep {
    #[serde(rename_all = "camelCase")]
    Presented {
        #[serde(default)]
        identifier: String,
        #[serde(default)]
        user_info: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    Selected {
        #[serde(default)]
        action_identifier: String,
        #[serde(default)]
        user_info: Map<String, Value>,
    },
    Attach,
    Call {
        method: String,
        #[serde(default)]
        arguments: Value,
    },
}

pub fn load_script(path: &Path) -> Result<Vec<ReplayStep>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read replay script {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse replay script {}", path.display()))
}

/// Scheduler that only records requests in the log.
#[derive(Debug, Default)]
pub struct LoggingScheduler;

impl NotificationScheduler for LoggingScheduler {
    fn show(&self, request: NotificationRequest) -> notif_core::Result<()> {
        info!(id = request.id, scheduled_for = ?request.scheduled_for, "show notification");
        Ok(())
    }

    fn cancel(&self, id: i64) -> notif_core::Result<()> {
        info!(id, "cancel notification");
        Ok(())
    }

    fn cancel_all(&self) -> notif_core::Result<()> {
        info!("cancel all notifications");
        Ok(())
    }

    fn create_channel(&self, settings: NotificationChannelSettings) -> notif_core::Result<()> {
        info!(id = %settings.id, importance = settings.importance, "create channel");
        Ok(())
    }
}

/// Builds a plugin whose host channel feeds the returned receiver.
pub fn build_plugin(config: PluginConfig) -> (Arc<LocalNotificationsPlugin>, Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let plugin = LocalNotificationsPlugin::builder(Arc::new(JsonChannel::new(tx)))
        .with_config(config)
        .with_scheduler(Arc::new(LoggingScheduler))
        .build();
    (Arc::new(plugin), rx)
}

/// Lines describing what happened, in order: host deliveries as JSON and
/// method-call results.
pub fn replay(
    plugin: &LocalNotificationsPlugin,
    host: &Receiver<String>,
    steps: &[ReplayStep],
) -> Result<Vec<String>> {
    let mut transcript = Vec::new();
    let delegate = plugin.delegate();
    for (index, step) in steps.iter().enumerate() {
        debug!(index, ?step, "replaying step");
        match step {
            ReplayStep::Presented {
                identifier,
                user_info,
            } => {
                let (tx, rx) = mpsc::channel();
                delegate.on_presented(
                    PresentedNotification {
                        identifier: identifier.clone(),
                        user_info: user_info.clone(),
                    },
                    PresentationCompletion::new(move |options| {
                        let _ = tx.send(options);
                    }),
                );
                let options = rx
                    .recv()
                    .with_context(|| format!("step {index}: presentation was never answered"))?;
                transcript.push(format!(
                    "present {identifier}: alert={} sound={} badge={}",
                    options.alert, options.sound, options.badge
                ));
            }
            ReplayStep::Selected {
                action_identifier,
                user_info,
            } => {
                delegate.on_selected(
                    RawResponse::new(action_identifier.clone(), user_info.clone()),
                    ResponseCompletion::new(|| {}),
                );
            }
            ReplayStep::Attach => {
                plugin.attach();
            }
            ReplayStep::Call { method, arguments } => {
                let call = MethodCall::new(method.clone(), arguments.clone());
                match plugin.handle_method_call(&call) {
                    Ok(result) => transcript.push(format!("{method} -> {result}")),
                    Err(err) => transcript.push(format!("{method} failed: {err}")),
                }
            }
        }
        transcript.extend(host.try_iter());
    }
    transcript.push(format!(
        "resumingFromBackground={}",
        plugin.is_resuming_from_background()
    ));
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_script(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp script");
        file.write_all(contents.as_bytes()).expect("write script");
        file
    }

    #[test]
    fn cold_launch_script_replays_after_attach() {
        let script = write_script(
            r#"[
                {"event": "selected", "actionIdentifier": "", "userInfo": {"NotificationId": 1, "payload": "a"}},
                {"event": "selected", "actionIdentifier": "open", "userInfo": {"NotificationId": 2, "payload": "b"}},
                {"event": "call", "method": "getNotificationAppLaunchDetails"},
                {"event": "attach"}
            ]"#,
        );
        let steps = load_script(script.path()).expect("load script");
        let (plugin, host) = build_plugin(PluginConfig::default());
        let transcript = replay(&plugin, &host, &steps).expect("replay");

        assert_eq!(
            transcript[0],
            r#"getNotificationAppLaunchDetails -> {"notificationLaunchedApp":true,"payload":"a"}"#
        );
        let first: MethodCall = serde_json::from_str(&transcript[1]).expect("first delivery");
        let second: MethodCall = serde_json::from_str(&transcript[2]).expect("second delivery");
        assert_eq!(first.arguments["notificationId"], 1);
        assert_eq!(second.arguments["actionId"], "open");
        assert_eq!(transcript.last().map(String::as_str), Some("resumingFromBackground=true"));
    }

    #[test]
    fn presented_and_scheduler_calls_are_reported() {
        let steps: Vec<ReplayStep> = serde_json::from_str(
            r#"[
                {"event": "call", "method": "initialize", "arguments": {"defaultPresentBadge": false}},
                {"event": "presented", "identifier": "7"},
                {"event": "call", "method": "cancel", "arguments": 7},
                {"event": "call", "method": "bogus"}
            ]"#,
        )
        .expect("parse steps");
        let (plugin, host) = build_plugin(PluginConfig::default());
        let transcript = replay(&plugin, &host, &steps).expect("replay");

        assert_eq!(transcript[0], "initialize -> true");
        assert_eq!(transcript[1], "present 7: alert=true sound=true badge=false");
        assert_eq!(transcript[2], "cancel -> null");
        assert!(transcript[3].starts_with("bogus failed"));
        assert_eq!(transcript[4], "resumingFromBackground=false");
    }

    #[test]
    fn missing_script_is_an_error() {
        assert!(load_script(Path::new("/nonexistent/replay.json")).is_err());
    }
}
