use colored::*;
use pingweb_core::{Notification, Severity, transport::ConnectError};
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Notification> for FormattedString {
    fn from(notification: Notification) -> Self {
        let text = match notification.severity {
            Severity::Success => notification.message.green(),
            Severity::Danger => notification.message.red().bold(),
        };
        FormattedString(text.to_string())
    }
}

impl From<ConnectError> for FormattedString {
    fn from(err: ConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}
