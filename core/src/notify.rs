//! Transient user notifications ("toasts").
//!
//! The gateway hands a `Toast` to a `Notifier` and moves on. Notifiers report
//! delivery problems through `NotifyError`; the gateway logs those and never
//! lets them change the outcome of the call.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How long a toast stays on screen unless the caller says otherwise.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            duration: DEFAULT_DURATION,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Danger)
    }
}

#[derive(Debug, Error)]
#[error("notification not delivered: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget notification sink. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast) -> Result<(), NotifyError>;
}

/// Renders toasts as log events. Used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) -> Result<(), NotifyError> {
        match toast.severity {
            Severity::Danger | Severity::Warning => {
                warn!(severity = ?toast.severity, "{}", toast.message);
            }
            Severity::Success | Severity::Info => {
                info!(severity = ?toast.severity, "{}", toast.message);
            }
        }
        Ok(())
    }
}

/// Forwards toasts to whoever drains the paired receiver.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, toast: Toast) -> Result<(), NotifyError> {
        self.tx
            .send(toast)
            .map_err(|_| NotifyError("receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_toast_uses_default_duration() {
        let toast = Toast::danger("db down");
        assert_eq!(toast.severity, Severity::Danger);
        assert_eq!(toast.duration, Duration::from_secs(2));
    }

    #[test]
    fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Toast::danger("first")).unwrap();
        notifier.notify(Toast::new("second", Severity::Info)).unwrap();
        assert_eq!(rx.try_recv().unwrap().message, "first");
        assert_eq!(rx.try_recv().unwrap().message, "second");
    }

    #[test]
    fn channel_notifier_reports_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        assert!(notifier.notify(Toast::danger("lost")).is_err());
    }

    #[test]
    fn tracing_notifier_never_fails() {
        assert!(TracingNotifier.notify(Toast::danger("x")).is_ok());
    }
}
