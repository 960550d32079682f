use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a notification arriving in the foreground should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl PresentationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }

    pub fn none() -> Self {
        Self {
            alert: false,
            sound: false,
            badge: false,
        }
    }
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Notification descriptor handed over by the OS for the "will present"
/// callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentedNotification {
    pub identifier: String,
    pub user_info: Map<String, Value>,
}

type PresentationHandler = Box<dyn FnOnce(PresentationOptions) + Send>;
type ResponseHandler = Box<dyn FnOnce() + Send>;

/// One-shot answer to the OS for a foreground notification.
///
/// Dropping the handle without calling [`complete`](Self::complete) answers
/// with [`PresentationOptions::none`], so the OS always gets a reply.
pub struct PresentationCompletion {
    handler: Option<PresentationHandler>,
}

impl PresentationCompletion {
    pub fn new(handler: impl FnOnce(PresentationOptions) + Send + 'static) -> Self {
        Self {
            handler: Some(Box::new(handler)),
        }
    }

    pub fn complete(mut self, options: PresentationOptions) {
        if let Some(handler) = self.handler.take() {
            handler(options);
        }
    }
}

impl Drop for PresentationCompletion {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            tracing::warn!("presentation completion dropped without a decision");
            handler(PresentationOptions::none());
        }
    }
}

/// One-shot acknowledgement for the "user responded" callback. Fires on drop
/// if never called explicitly.
pub struct ResponseCompletion {
    handler: Option<ResponseHandler>,
}

impl ResponseCompletion {
    pub fn new(handler: impl FnOnce() + Send + 'static) -> Self {
        Self {
            handler: Some(Box::new(handler)),
        }
    }

    pub fn complete(mut self) {
        if let Some(handler) = self.handler.take() {
            handler();
        }
    }
}

impl Drop for ResponseCompletion {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler();
        }
    }
}

/// Decides how a foreground notification is shown. Implementations may keep
/// the completion and answer later from another thread.
pub trait PresentationDecider: Send + Sync {
    fn decide(&self, notification: &PresentedNotification, completion: PresentationCompletion);
}

/// Answers synchronously with the configured options.
#[derive(Debug, Default)]
pub struct ConfiguredPresentation {
    options: RwLock<PresentationOptions>,
}

impl ConfiguredPresentation {
    pub fn new(options: PresentationOptions) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }

    pub fn options(&self) -> PresentationOptions {
        *self.options.read()
    }

    pub fn set_options(&self, options: PresentationOptions) {
        *self.options.write() = options;
    }
}

impl PresentationDecider for ConfiguredPresentation {
    fn decide(&self, notification: &PresentedNotification, completion: PresentationCompletion) {
        let options = self.options();
        tracing::debug!(
            identifier = %notification.identifier,
            ?options,
            "presenting in foreground"
        );
        completion.complete(options);
    }
}
