use crate::domain::ports::{Navigator, Notification, Notifier, Severity};

/// Navigator for a headless run: there is no page to leave, so the redirect
/// is only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "redirecting");
    }
}

/// Sends notifications to the log instead of a snackbar.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::error!(text = %notification.message, "notification"),
        }
    }
}
