//! Thing-update device agent library.
//!
//! Exposes the config, connection manager and lifecycle so `tu-e2e-tests`
//! can drive the startup sequence against mocks.

pub mod config;
pub mod connector;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod mock;

pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use connector::{BrokerConnector, Connector};
pub use manager::{ConnectionManager, ProtocolVariant};
pub use mock::MockConnector;
