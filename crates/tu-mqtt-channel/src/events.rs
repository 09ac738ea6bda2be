//! Connection lifecycle callbacks for the event-loop transport.

use rumqttc::ConnectionError;

/// Hooks invoked by the modern transport's event loop driver.
///
/// Callbacks only observe: they must not resubscribe or re-authenticate.
pub trait ConnectionEvents: Send + Sync {
    /// The session dropped after it had been established.
    fn on_connection_interrupted(&self, error: &ConnectionError);

    /// A new CONNACK arrived after an interruption.
    fn on_connection_resumed(&self, session_present: bool);
}

/// Default callbacks: log and carry on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEvents;

impl ConnectionEvents for LoggingEvents {
    fn on_connection_interrupted(&self, error: &ConnectionError) {
        tracing::info!(error = %error, "connection interrupted");
    }

    fn on_connection_resumed(&self, session_present: bool) {
        let session = if session_present {
            "existing session"
        } else {
            "clean session"
        };
        tracing::info!(session, "connection resumed");
    }
}
