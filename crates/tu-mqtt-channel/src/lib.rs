//! MQTT channel for AWS IoT Core over SigV4-signed WebSockets.
//!
//! Provides the two broker transports the device agent chooses between:
//! - `ClassicConnection`: blocking `rumqttc::Client` driven on its own thread
//! - `ModernConnection`: `rumqttc::AsyncClient` with a tokio event loop and
//!   interrupt/resume lifecycle callbacks
//! - `Channel` / `Connection` traits (mockable in tests), `MockChannel`, `MockConnection`
//! - presigned `wss://` URL construction from temporary credentials

pub mod channel;
pub mod classic;
pub mod config;
mod driver;
pub mod error;
pub mod events;
pub mod handler;
pub mod mock;
pub mod modern;
pub mod signing;
pub mod status;

// Re-exports for convenience.
pub use channel::{Channel, Connection, subscribe_thing_updates};
pub use classic::ClassicConnection;
pub use config::MqttConfig;
pub use error::{MqttError, MqttResult};
pub use events::{ConnectionEvents, LoggingEvents};
pub use handler::{PayloadLevel, ReceivedMessage};
pub use mock::{MockChannel, MockConnection};
pub use modern::ModernConnection;
pub use signing::{presigned_url, websocket_options};
pub use status::{ConnectionStatus, StatusHandle};
