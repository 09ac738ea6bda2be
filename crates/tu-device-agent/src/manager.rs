//! Connection manager. Owns the agent's single broker connection.

use chrono::Utc;
use tu_mqtt_channel::{Connection, ConnectionStatus, MqttConfig, subscribe_thing_updates};
use tu_protocol::TemporaryCredentials;

use crate::config::AgentConfig;
use crate::connector::{BrokerConnector, Connector};
use crate::error::{AgentError, AgentResult};

/// Which client implementation carries the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// Blocking client; payloads logged at `info`.
    Classic,
    /// Async client with interrupt/resume callbacks; payloads logged at `trace`.
    Modern,
}

impl ProtocolVariant {
    /// `2` selects `Modern`; every other value selects `Classic`.
    pub fn from_version(version: i64) -> Self {
        if version == 2 {
            Self::Modern
        } else {
            Self::Classic
        }
    }
}

impl std::fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::Modern => f.write_str("modern"),
        }
    }
}

/// Establishes at most one broker connection and closes it on shutdown.
pub struct ConnectionManager {
    variant: ProtocolVariant,
    mqtt: MqttConfig,
    region: String,
    connector: Box<dyn Connector>,
    active: Option<Box<dyn Connection>>,
}

impl ConnectionManager {
    pub fn new(variant: ProtocolVariant, mqtt: MqttConfig, region: impl Into<String>) -> Self {
        Self {
            variant,
            mqtt,
            region: region.into(),
            connector: Box::new(BrokerConnector::default()),
            active: None,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            ProtocolVariant::from_version(config.device.version),
            config.mqtt.clone(),
            config.region.clone(),
        )
    }

    /// Replace how the connection is opened.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    pub fn status(&self) -> ConnectionStatus {
        self.active
            .as_ref()
            .map_or(ConnectionStatus::Unconnected, |conn| conn.status())
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Connect with `credentials` and subscribe to thing updates.
    pub async fn connect(&mut self, credentials: &TemporaryCredentials) -> AgentResult<()> {
        if self.active.is_some() {
            return Err(AgentError::AlreadyConnected);
        }
        self.mqtt.validate()?;

        if credentials.is_expired_at(Utc::now()) {
            tracing::warn!(
                expiration = ?credentials.expiration,
                "credentials already expired, broker will likely refuse the connection"
            );
        }

        let connection = self
            .connector
            .open(self.variant, &self.mqtt, &self.region, credentials)
            .await?;

        // Kept before subscribing so a failed subscribe still gets closed.
        let connection = self.active.insert(connection);
        subscribe_thing_updates(&**connection).await?;
        Ok(())
    }

    /// Close the connection if one is open. Safe to call repeatedly.
    pub async fn close(&mut self) -> AgentResult<()> {
        match self.active.take() {
            Some(connection) => {
                connection.close().await?;
                tracing::info!(variant = %self.variant, "broker connection closed");
            }
            None => tracing::debug!("no broker connection to close"),
        }
        Ok(())
    }
}
