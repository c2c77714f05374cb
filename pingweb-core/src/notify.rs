//! # Notifications
//!
//! The presentation side of every call. The core never renders anything itself; it hands
//! formatted [`Notification`]s to a [`NotificationSink`].
use crate::messages::PongLike;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Danger,
        }
    }

    /// `Resp: <timestamp> - <service name>`
    pub fn response(pong: &impl PongLike) -> Self {
        Self::success(format!(
            "Resp: {} - {}",
            pong.timestamp(),
            pong.service_name()
        ))
    }

    /// `Error code: <numeric code> "<message>"`
    pub fn status(status: &tonic::Status) -> Self {
        Self::danger(format!(
            "Error code: {} \"{}\"",
            status.code() as i32,
            status.message()
        ))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl NotificationSink for UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::warn!("Notification dropped, the receiver is gone");
        }
    }
}

impl<N: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
