use serde::Deserialize;

use crate::error::{MqttError, MqttResult};

/// MQTT connection configuration, loadable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// AWS IoT data endpoint (e.g., `a1b2c3-ats.iot.us-east-1.amazonaws.com`).
    pub endpoint: String,
    /// MQTT client ID (should be unique per device).
    pub client_id: String,
    /// WebSocket port (default 443).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
    /// Lifetime of the presigned connect URL in seconds.
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: u64,
}

fn default_port() -> u16 {
    443
}

fn default_keepalive() -> u16 {
    30
}

fn default_presign_expiry() -> u64 {
    3600
}

impl MqttConfig {
    pub fn new(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            port: default_port(),
            keepalive_secs: default_keepalive(),
            presign_expiry_secs: default_presign_expiry(),
        }
    }

    /// Reject values rumqttc or the signer would choke on.
    pub fn validate(&self) -> MqttResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(MqttError::Config("endpoint is empty".into()));
        }
        if self.endpoint.contains("://") || self.endpoint.contains('/') {
            return Err(MqttError::Config(format!(
                "endpoint must be a bare hostname, got '{}'",
                self.endpoint
            )));
        }
        if self.client_id.trim().is_empty() || self.client_id.starts_with(' ') {
            return Err(MqttError::Config("client_id is empty".into()));
        }
        // SigV4 presigned URLs are valid for at most 7 days.
        if self.presign_expiry_secs == 0 || self.presign_expiry_secs > 604_800 {
            return Err(MqttError::Config(format!(
                "presign_expiry_secs must be within 1..=604800, got {}",
                self.presign_expiry_secs
            )));
        }
        Ok(())
    }
}
