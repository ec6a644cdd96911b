use screen_session_core::{Notification, Severity, UiSink};

use std::io::Write;

use tracing::debug;

/// Prints controller notifications to stdout.
pub struct TerminalSink;

impl TerminalSink {
    /// One line per notification: state, severity marker, message, then the
    /// commands available next.
    pub fn render(notification: &Notification) -> String {
        let marker = match notification.severity {
            Severity::Info if notification.busy() => "...",
            Severity::Info => "--",
            Severity::Success => "ok",
            Severity::Error => "!!",
        };

        let controls: Vec<String> = notification
            .controls
            .enabled()
            .map(|event| event.to_string())
            .collect();
        let available = if controls.is_empty() {
            "none".to_string()
        } else {
            controls.join(", ")
        };

        format!(
            "[{}] {} {}  (available: {})",
            notification.state, marker, notification.message, available
        )
    }
}

impl UiSink for TerminalSink {
    fn notify(&self, notification: &Notification) {
        debug!(
            state = %notification.state,
            severity = ?notification.severity,
            kind = ?notification.kind,
            "Notification"
        );

        let mut stdout = std::io::stdout().lock();
        // A closed stdout leaves nothing to report to.
        let _ = writeln!(stdout, "\r{}", Self::render(notification));
        let _ = stdout.flush();
    }
}
