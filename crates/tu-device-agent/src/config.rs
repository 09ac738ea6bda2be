//! Device agent configuration, loadable from TOML with environment overrides.

use std::str::FromStr;

use serde::Deserialize;
use tu_cognito_auth::BrokerConfig;
use tu_mqtt_channel::MqttConfig;

use crate::error::{AgentError, AgentResult};

/// Overrides `device.version`.
pub const ENV_DEVICE_VERSION: &str = "TU_DEVICE_VERSION";
/// Overrides `mqtt.client_id`.
pub const ENV_CLIENT_ID: &str = "TU_MQTT_CLIENT_ID";

/// Top-level configuration for the device agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// AWS region shared by Cognito, Lambda and IoT (e.g. `us-east-1`).
    pub region: String,
    pub cognito: CognitoConfig,
    pub authorizer: AuthorizerConfig,
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CognitoConfig {
    pub identity_pool_id: String,
    pub user_pool: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizerConfig {
    pub function_name: String,
    /// Sent to the authorizer as a JSON object.
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Protocol version; `2` selects the modern client.
    #[serde(default = "default_version")]
    pub version: i64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

fn default_version() -> i64 {
    1
}

impl AgentConfig {
    /// Load config from a TOML file path, then apply environment overrides.
    pub fn from_file(path: &str) -> AgentResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("failed to read {path}: {e}")))?;
        let mut config: Self = contents.parse()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AgentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_DEVICE_VERSION) {
            self.device.version = raw.trim().parse().map_err(|_| {
                AgentError::Config(format!("{ENV_DEVICE_VERSION} is not an integer: '{raw}'"))
            })?;
        }
        if let Some(client_id) = lookup(ENV_CLIENT_ID) {
            self.mqtt.client_id = client_id;
        }
        Ok(())
    }

    /// Settings for the credential broker.
    pub fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            region: self.region.clone(),
            identity_pool_id: self.cognito.identity_pool_id.clone(),
            user_pool: self.cognito.user_pool.clone(),
            function_name: self.authorizer.function_name.clone(),
            payload: self.authorizer.payload.clone(),
        }
    }
}

impl FromStr for AgentConfig {
    type Err = AgentError;

    fn from_str(s: &str) -> AgentResult<Self> {
        toml::from_str(s).map_err(|e| AgentError::Config(e.to_string()))
    }
}
