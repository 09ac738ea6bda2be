//! Mock connector for testing the agent without a real broker.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tu_mqtt_channel::{Connection, MockChannel, MockConnection, MqttConfig};
use tu_protocol::TemporaryCredentials;

use crate::connector::Connector;
use crate::error::AgentResult;
use crate::manager::ProtocolVariant;

/// A recorded connection attempt.
#[derive(Debug, Clone)]
pub struct OpenCall {
    pub variant: ProtocolVariant,
    pub client_id: String,
    pub credentials: TemporaryCredentials,
}

/// Mock implementation of the `Connector` trait.
///
/// Every connection it opens shares one `MockChannel`.
pub struct MockConnector {
    channel: Arc<MockChannel>,
    opened: Mutex<Vec<OpenCall>>,
}

impl MockConnector {
    pub fn new(channel: Arc<MockChannel>) -> Self {
        Self {
            channel,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded connection attempts, in order.
    pub fn opened(&self) -> Vec<OpenCall> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(
        &self,
        variant: ProtocolVariant,
        mqtt: &MqttConfig,
        _region: &str,
        credentials: &TemporaryCredentials,
    ) -> AgentResult<Box<dyn Connection>> {
        self.opened.lock().unwrap().push(OpenCall {
            variant,
            client_id: mqtt.client_id.clone(),
            credentials: credentials.clone(),
        });
        Ok(Box::new(MockConnection::new(self.channel.clone())))
    }
}
