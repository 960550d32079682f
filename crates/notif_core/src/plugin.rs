use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::channel::{HostChannel, MethodCall};
use crate::config::{InitializationSettings, PluginConfig};
use crate::delegate::DelegateAdapter;
use crate::error::{NotificationError, Result};
use crate::launch::LaunchState;
use crate::presentation::{ConfiguredPresentation, PresentationDecider};
use crate::publisher::BridgePublisher;
use crate::scheduling::{NotificationChannelSettings, NotificationRequest, NotificationScheduler};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDetails {
    pub notification_launched_app: bool,
    pub payload: Option<String>,
}

/// Wires the coordination core together: one launch tracker, one publisher
/// and one delegate adapter per process.
pub struct LocalNotificationsPlugin {
    launch: Arc<LaunchState>,
    publisher: Arc<BridgePublisher>,
    delegate: Arc<DelegateAdapter>,
    presentation: Arc<ConfiguredPresentation>,
    scheduler: Option<Arc<dyn NotificationScheduler>>,
}

pub struct LocalNotificationsPluginBuilder {
    channel: Arc<dyn HostChannel>,
    config: PluginConfig,
    scheduler: Option<Arc<dyn NotificationScheduler>>,
    decider: Option<Arc<dyn PresentationDecider>>,
}

impl LocalNotificationsPluginBuilder {
    pub fn new(channel: Arc<dyn HostChannel>) -> Self {
        Self {
            channel,
            config: PluginConfig::default(),
            scheduler: None,
            decider: None,
        }
    }

    pub fn with_config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn NotificationScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Replaces the configured presentation policy. `initialize` settings
    /// then no longer affect foreground presentation.
    pub fn with_presentation_decider(mut self, decider: Arc<dyn PresentationDecider>) -> Self {
        self.decider = Some(decider);
        self
    }

    pub fn build(self) -> LocalNotificationsPlugin {
        let launch = Arc::new(LaunchState::new());
        let publisher = Arc::new(BridgePublisher::new(self.channel, launch.clone()));
        let presentation = Arc::new(ConfiguredPresentation::new(self.config.presentation()));
        let decider = self
            .decider
            .unwrap_or_else(|| presentation.clone() as Arc<dyn PresentationDecider>);
        let delegate = Arc::new(DelegateAdapter::new(publisher.clone(), decider));
        LocalNotificationsPlugin {
            launch,
            publisher,
            delegate,
            presentation,
            scheduler: self.scheduler,
        }
    }
}

impl LocalNotificationsPlugin {
    pub fn builder(channel: Arc<dyn HostChannel>) -> LocalNotificationsPluginBuilder {
        LocalNotificationsPluginBuilder::new(channel)
    }

    /// The adapter to register with the OS notification center.
    pub fn delegate(&self) -> Arc<DelegateAdapter> {
        self.delegate.clone()
    }

    pub fn publisher(&self) -> &BridgePublisher {
        &self.publisher
    }

    pub fn is_resuming_from_background(&self) -> bool {
        self.launch.is_resuming()
    }

    /// Host readiness signal; replays anything that arrived earlier.
    pub fn attach(&self) -> usize {
        self.publisher.attach()
    }

    pub fn launch_details(&self) -> LaunchDetails {
        LaunchDetails {
            notification_launched_app: self.launch.is_resuming(),
            payload: self.launch.launch_response().map(|r| r.payload.clone()),
        }
    }

    #[instrument(skip(self, call), fields(method = %call.method))]
    pub fn handle_method_call(&self, call: &MethodCall) -> Result<Value> {
        match call.method.as_str() {
            "initialize" => {
                let settings = parse_initialization(&call.arguments)?;
                self.presentation
                    .set_options(settings.apply(self.presentation.options()));
                self.attach();
                Ok(Value::Bool(true))
            }
            "getNotificationAppLaunchDetails" => Ok(serde_json::to_value(self.launch_details())?),
            "show" => {
                let request: NotificationRequest = serde_json::from_value(call.arguments.clone())
                    .map_err(|err| NotificationError::invalid_arguments("show", err.to_string()))?;
                self.scheduler()?.show(request)?;
                Ok(Value::Null)
            }
            "cancel" => {
                let id = call
                    .arguments
                    .as_i64()
                    .or_else(|| call.arguments.get("id").and_then(Value::as_i64))
                    .ok_or_else(|| {
                        NotificationError::invalid_arguments("cancel", "missing integer id")
                    })?;
                self.scheduler()?.cancel(id)?;
                Ok(Value::Null)
            }
            "cancelAll" => {
                self.scheduler()?.cancel_all()?;
                Ok(Value::Null)
            }
            "createNotificationChannel" => {
                let settings = NotificationChannelSettings::from_arguments(&call.arguments)?;
                self.scheduler()?.create_channel(settings)?;
                Ok(Value::Null)
            }
            other => Err(NotificationError::UnknownMethod(other.to_string())),
        }
    }

    fn scheduler(&self) -> Result<&Arc<dyn NotificationScheduler>> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| NotificationError::Scheduler("no scheduler registered".into()))
    }
}

fn parse_initialization(arguments: &Value) -> Result<InitializationSettings> {
    if arguments.is_null() {
        return Ok(InitializationSettings::default());
    }
    serde_json::from_value(arguments.clone())
        .map_err(|err| NotificationError::invalid_arguments("initialize", err.to_string()))
}
