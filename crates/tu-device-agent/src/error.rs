use tu_cognito_auth::AuthError;
use tu_mqtt_channel::MqttError;

/// Errors surfaced by the agent's startup and shutdown.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("config error: {0}")]
    Config(String),

    #[error("credential broker failed: {0}")]
    Auth(#[from] AuthError),

    #[error("broker connection failed: {0}")]
    Mqtt(#[from] MqttError),

    #[error("a broker connection is already open")]
    AlreadyConnected,
}

pub type AgentResult<T> = Result<T, AgentError>;
