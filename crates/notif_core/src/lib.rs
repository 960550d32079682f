pub mod channel;
pub mod config;
pub mod delegate;
pub mod error;
pub mod launch;
pub mod plugin;
pub mod presentation;
pub mod publisher;
pub mod queue;
pub mod response;
pub mod scheduling;

pub use crate::error::{NotificationError, Result};
pub use crate::plugin::{LocalNotificationsPlugin, LocalNotificationsPluginBuilder};
