//! Subscription and connection seams shared by both transports and the mock.

use async_trait::async_trait;
use rumqttc::QoS;

use crate::error::MqttResult;
use crate::status::ConnectionStatus;
use tu_protocol::topics;

/// Abstraction for MQTT subscribing.
///
/// Enables mocking in tests without a real MQTT broker.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Subscribe to a topic filter.
    async fn subscribe(&self, filter: &str, qos: QoS) -> MqttResult<()>;
}

/// An open broker connection that can report its status and be closed.
#[async_trait]
pub trait Connection: Channel {
    fn status(&self) -> ConnectionStatus;

    /// Close the connection, consuming it.
    async fn close(self: Box<Self>) -> MqttResult<()>;
}

/// Subscribe to `thing-update/#` with at-most-once delivery.
pub async fn subscribe_thing_updates<C: Channel + ?Sized>(channel: &C) -> MqttResult<()> {
    channel
        .subscribe(topics::THING_UPDATE_FILTER, QoS::AtMostOnce)
        .await?;
    tracing::info!(filter = topics::THING_UPDATE_FILTER, "subscribed");
    Ok(())
}
