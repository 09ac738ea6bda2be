//! Mock MQTT channel for testing without a real broker.
//!
//! Records subscription filters and disconnects for assertion in tests.

use async_trait::async_trait;
use rumqttc::QoS;
use std::sync::{Arc, Mutex};

use crate::channel::{Channel, Connection};
use crate::error::{MqttError, MqttResult};
use crate::status::{ConnectionStatus, StatusHandle};

/// Mock implementation of the `Channel` trait.
///
/// Thread-safe via `Mutex` (fine for test contexts).
pub struct MockChannel {
    subscriptions: Mutex<Vec<(String, QoS)>>,
    disconnects: Mutex<usize>,
    reject: bool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            disconnects: Mutex::new(0),
            reject: false,
        }
    }

    /// A channel whose broker refuses every subscription.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::new()
        }
    }

    /// Get all subscription filters.
    pub fn subscriptions(&self) -> Vec<(String, QoS)> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Check whether a subscription was made to the given filter.
    pub fn is_subscribed_to(&self, filter: &str) -> bool {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .any(|(f, _)| f == filter)
    }

    /// Number of disconnects sent by connections over this channel.
    pub fn disconnect_count(&self) -> usize {
        *self.disconnects.lock().unwrap()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn subscribe(&self, filter: &str, qos: QoS) -> MqttResult<()> {
        if self.reject {
            return Err(MqttError::Subscribe(format!("not authorized for {filter}")));
        }
        self.subscriptions
            .lock()
            .unwrap()
            .push((filter.to_string(), qos));
        Ok(())
    }
}

/// Mock open connection over a shared [`MockChannel`].
///
/// Starts `Connected`; closing sends one disconnect while still connected.
pub struct MockConnection {
    channel: Arc<MockChannel>,
    status: StatusHandle,
}

impl MockConnection {
    pub fn new(channel: Arc<MockChannel>) -> Self {
        Self {
            channel,
            status: StatusHandle::new(ConnectionStatus::Connected),
        }
    }
}

#[async_trait]
impl Channel for MockConnection {
    async fn subscribe(&self, filter: &str, qos: QoS) -> MqttResult<()> {
        self.channel.subscribe(filter, qos).await
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    async fn close(self: Box<Self>) -> MqttResult<()> {
        if self.status.close() == ConnectionStatus::Connected {
            *self.channel.disconnects.lock().unwrap() += 1;
        }
        Ok(())
    }
}
