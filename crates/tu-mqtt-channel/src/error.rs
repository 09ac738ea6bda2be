//! MQTT channel error types.

use thiserror::Error;

/// Errors that can occur during MQTT operations.
#[derive(Debug, Error)]
pub enum MqttError {
    /// Broker unreachable or connection refused before CONNACK.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("subscribe error: {0}")]
    Subscribe(String),

    #[error("disconnect error: {0}")]
    Disconnect(String),

    #[error("signing error: {0}")]
    Signing(String),

    /// The connect wait was cut short (driver thread gone, task cancelled).
    #[error("interrupted: {0}")]
    Interrupted(String),

    #[error("invalid config: {0}")]
    Config(String),
}

/// Convenience alias for MQTT results.
pub type MqttResult<T> = Result<T, MqttError>;
