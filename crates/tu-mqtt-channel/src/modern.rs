//! Modern transport over `rumqttc::AsyncClient` with a tokio event loop.
//!
//! `connect` awaits the event loop until CONNACK, then hands the loop to a
//! spawned task. Lifecycle changes go through [`ConnectionEvents`];
//! payloads are logged at `trace`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::task::JoinHandle;

use crate::channel::{Channel, Connection};
use crate::driver::{Driver, RECONNECT_DELAY, Step};
use crate::error::{MqttError, MqttResult};
use crate::events::ConnectionEvents;
use crate::handler::PayloadLevel;
use crate::status::{ConnectionStatus, StatusHandle};

/// Capacity of the client → event loop request queue.
const REQUEST_CAPACITY: usize = 64;

/// How long `close` waits for the event loop to flush the disconnect.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Live session on the async client.
pub struct ModernConnection {
    client: AsyncClient,
    status: StatusHandle,
    driver: JoinHandle<()>,
}

impl ModernConnection {
    /// Connect and wait for CONNACK.
    pub async fn connect(
        options: MqttOptions,
        events: Arc<dyn ConnectionEvents>,
    ) -> MqttResult<Self> {
        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Trace, Some(events));

        loop {
            match driver.observe(eventloop.poll().await) {
                Step::Ready => break,
                Step::Failed(e) => return Err(e),
                Step::Stop => {
                    return Err(MqttError::Interrupted(
                        "event loop stopped before CONNACK".into(),
                    ));
                }
                Step::Continue | Step::Backoff => {}
            }
        }
        tracing::info!("modern connection established");

        let driver = tokio::spawn(drive(eventloop, driver));
        Ok(Self {
            client,
            status,
            driver,
        })
    }

    /// Close the session and stop the event loop task.
    pub async fn close(mut self) -> MqttResult<()> {
        let previous = self.status.close();

        let result = if previous == ConnectionStatus::Closed || self.driver.is_finished() {
            Ok(())
        } else {
            self.client
                .disconnect()
                .await
                .map_err(|e| MqttError::Disconnect(e.to_string()))
        };

        if tokio::time::timeout(CLOSE_GRACE, &mut self.driver)
            .await
            .is_err()
        {
            tracing::debug!("event loop did not stop in time, aborting");
            self.driver.abort();
        }

        tracing::info!("modern connection closed");
        result
    }
}

#[async_trait]
impl Channel for ModernConnection {
    async fn subscribe(&self, filter: &str, qos: QoS) -> MqttResult<()> {
        self.client
            .subscribe(filter, qos)
            .await
            .map_err(|e| MqttError::Subscribe(e.to_string()))
    }
}

#[async_trait]
impl Connection for ModernConnection {
    fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    async fn close(self: Box<Self>) -> MqttResult<()> {
        ModernConnection::close(*self).await
    }
}

async fn drive(mut eventloop: EventLoop, mut driver: Driver) {
    loop {
        match driver.observe(eventloop.poll().await) {
            Step::Stop => break,
            Step::Backoff => {
                tokio::time::sleep(RECONNECT_DELAY).await;
                if !driver.should_resume() {
                    break;
                }
            }
            Step::Continue | Step::Ready | Step::Failed(_) => {}
        }
    }
    tracing::debug!("modern event loop stopped");
}
