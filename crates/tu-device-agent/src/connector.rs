//! Opens the broker connection for the selected protocol variant.

use std::sync::Arc;

use async_trait::async_trait;
use tu_mqtt_channel::{
    ClassicConnection, Connection, ConnectionEvents, LoggingEvents, MqttConfig, MqttError,
    ModernConnection, websocket_options,
};
use tu_protocol::TemporaryCredentials;

use crate::error::AgentResult;
use crate::manager::ProtocolVariant;

/// Abstraction over opening a broker connection.
///
/// Enables testing the connection manager without a real broker.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        variant: ProtocolVariant,
        mqtt: &MqttConfig,
        region: &str,
        credentials: &TemporaryCredentials,
    ) -> AgentResult<Box<dyn Connection>>;
}

#[async_trait]
impl<T: Connector + ?Sized> Connector for Arc<T> {
    async fn open(
        &self,
        variant: ProtocolVariant,
        mqtt: &MqttConfig,
        region: &str,
        credentials: &TemporaryCredentials,
    ) -> AgentResult<Box<dyn Connection>> {
        (**self).open(variant, mqtt, region, credentials).await
    }
}

/// Connects to AWS IoT over SigV4-signed WebSockets.
pub struct BrokerConnector {
    events: Arc<dyn ConnectionEvents>,
}

impl BrokerConnector {
    /// `events` receives the modern client's interrupt/resume callbacks.
    pub fn new(events: Arc<dyn ConnectionEvents>) -> Self {
        Self { events }
    }
}

impl Default for BrokerConnector {
    fn default() -> Self {
        Self::new(Arc::new(LoggingEvents))
    }
}

#[async_trait]
impl Connector for BrokerConnector {
    async fn open(
        &self,
        variant: ProtocolVariant,
        mqtt: &MqttConfig,
        region: &str,
        credentials: &TemporaryCredentials,
    ) -> AgentResult<Box<dyn Connection>> {
        let options = websocket_options(mqtt, region, credentials)?;
        tracing::info!(
            variant = %variant,
            endpoint = %mqtt.endpoint,
            client_id = %mqtt.client_id,
            "connecting to broker"
        );

        let connection: Box<dyn Connection> = match variant {
            ProtocolVariant::Classic => {
                let conn = tokio::task::spawn_blocking(move || ClassicConnection::connect(options))
                    .await
                    .map_err(|e| MqttError::Interrupted(e.to_string()))??;
                Box::new(conn)
            }
            ProtocolVariant::Modern => {
                Box::new(ModernConnection::connect(options, self.events.clone()).await?)
            }
        };
        Ok(connection)
    }
}
