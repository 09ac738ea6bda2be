//! Classic transport over the blocking `rumqttc::Client`.
//!
//! `connect` blocks the calling thread until CONNACK; afterwards a
//! dedicated thread keeps iterating the `Connection` and logs every
//! publish (payload at `info`).

use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use rumqttc::{Client, Connection, MqttOptions, QoS};

use crate::channel::{Channel, Connection as BrokerConnection};
use crate::driver::{Driver, RECONNECT_DELAY, Step};
use crate::error::{MqttError, MqttResult};
use crate::handler::PayloadLevel;
use crate::status::{ConnectionStatus, StatusHandle};

/// Capacity of the client → event loop request queue.
const REQUEST_CAPACITY: usize = 10;

/// Live session on the blocking client.
pub struct ClassicConnection {
    client: Client,
    status: StatusHandle,
}

impl ClassicConnection {
    /// Connect and block until the broker acknowledges the session.
    ///
    /// Must not be called from an async context: the rumqttc `Connection`
    /// drives its own runtime.
    pub fn connect(options: MqttOptions) -> MqttResult<Self> {
        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let driver = Driver::new(status.clone(), PayloadLevel::Info, None);
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name("tu-mqtt-classic".into())
            .spawn(move || drive(connection, driver, ready_tx))
            .map_err(|e| MqttError::Connection(format!("failed to spawn driver thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("classic connection established");
                Ok(Self { client, status })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(MqttError::Interrupted(
                "driver thread exited before CONNACK".into(),
            )),
        }
    }

    /// Close the session. A disconnect is only sent while connected.
    pub fn close(self) -> MqttResult<()> {
        let previous = self.status.close();

        if should_disconnect(previous) {
            self.client
                .try_disconnect()
                .map_err(|e| MqttError::Disconnect(e.to_string()))?;
            tracing::info!("classic connection disconnected");
        } else {
            tracing::debug!(status = %previous, "not connected, skipping disconnect");
        }
        Ok(())
    }
}

/// Disconnect guard for the classic client.
pub fn should_disconnect(status: ConnectionStatus) -> bool {
    status == ConnectionStatus::Connected
}

#[async_trait]
impl Channel for ClassicConnection {
    async fn subscribe(&self, filter: &str, qos: QoS) -> MqttResult<()> {
        self.client
            .try_subscribe(filter, qos)
            .map_err(|e| MqttError::Subscribe(e.to_string()))
    }
}

#[async_trait]
impl BrokerConnection for ClassicConnection {
    fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    async fn close(self: Box<Self>) -> MqttResult<()> {
        ClassicConnection::close(*self)
    }
}

fn drive(mut connection: Connection, mut driver: Driver, ready: mpsc::Sender<MqttResult<()>>) {
    let mut ready = Some(ready);

    for notification in connection.iter() {
        match driver.observe(notification) {
            Step::Ready => {
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Ok(()));
                }
            }
            Step::Failed(e) => {
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Err(e));
                }
                break;
            }
            Step::Backoff => {
                thread::sleep(RECONNECT_DELAY);
                if !driver.should_resume() {
                    break;
                }
            }
            Step::Stop => break,
            Step::Continue => {}
        }
    }

    tracing::debug!("classic driver stopped");
}
