//! Alert sink implementations.

use crate::api::{AlertSink, RequestError};

const APP_NAME: &str = "Draftsmith";

/// Desktop notifications. Delivery failures are logged, never propagated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopAlerts;

impl DesktopAlerts {
    fn send(&self, summary: &str, body: &str) {
        if let Err(err) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}

impl AlertSink for DesktopAlerts {
    fn info(&self, message: &str) {
        self.send(APP_NAME, message);
    }

    fn success(&self, message: &str) {
        self.send(APP_NAME, message);
    }

    fn http_error(&self, error: &RequestError) {
        self.send("Request failed", &error.message());
    }
}

/// Log-only sink for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlerts;

impl AlertSink for TracingAlerts {
    fn info(&self, message: &str) {
        tracing::info!(alert = "info", "{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!(alert = "success", "{message}");
    }

    fn http_error(&self, error: &RequestError) {
        tracing::warn!(status = ?error.status, "{}", error.message());
    }
}
