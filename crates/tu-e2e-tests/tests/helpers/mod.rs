//! Shared test harness for E2E integration tests.
//!
//! Wires the agent config, the credential broker and a `MockConnector`
//! together, with mock Cognito and authorizer backends standing in for AWS.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use tu_cognito_auth::{CredentialBroker, MockAuthorizer, MockFederation};
use tu_device_agent::{AgentConfig, MockConnector};
use tu_device_agent::manager::ConnectionManager;
use tu_mqtt_channel::{MockChannel, presigned_url};
use tu_protocol::TemporaryCredentials;

/// Session token the mock authorizer issues.
pub const SESSION_TOKEN: &str = "authorizer-session-token";

/// Agent config as it would be read from `/etc/thing-update/agent.toml`.
pub const SAMPLE_CONFIG: &str = r#"
region = "us-east-1"

[cognito]
identity_pool_id = "us-east-1:11111111-2222-3333-4444-555555555555"
user_pool = "us-east-1_AbCdEf123"

[authorizer]
function_name = "thing-update-authorizer"
payload = { serial = "SN-0042", model = "tu-sensor" }

[mqtt]
endpoint = "a1b2c3-ats.iot.us-east-1.amazonaws.com"
client_id = "sensor-042"
"#;

/// End-to-end harness: mock AWS backends plus the real agent wiring.
pub struct TestHarness {
    pub config: AgentConfig,
    pub federation: MockFederation,
    pub authorizer: MockAuthorizer,
    /// Records what connections opened by `connector` subscribe to.
    pub mqtt: Arc<MockChannel>,
    pub connector: Arc<MockConnector>,
}

impl TestHarness {
    /// Harness whose authorizer issues [`SESSION_TOKEN`].
    pub fn new() -> Self {
        Self::with_authorizer(MockAuthorizer::with_token(SESSION_TOKEN))
    }

    pub fn with_authorizer(authorizer: MockAuthorizer) -> Self {
        Self::with_config(SAMPLE_CONFIG, authorizer)
    }

    pub fn with_config(toml: &str, authorizer: MockAuthorizer) -> Self {
        Self::with_channel(toml, authorizer, MockChannel::new())
    }

    pub fn with_channel(toml: &str, authorizer: MockAuthorizer, channel: MockChannel) -> Self {
        let mqtt = Arc::new(channel);
        Self {
            config: toml.parse().expect("sample config parses"),
            federation: MockFederation::new(),
            authorizer,
            connector: Arc::new(MockConnector::new(mqtt.clone())),
            mqtt,
        }
    }

    /// Broker over the harness mocks.
    pub fn broker(&self) -> CredentialBroker<&MockFederation, &MockAuthorizer> {
        CredentialBroker::new(
            &self.federation,
            &self.authorizer,
            self.config.broker_config(),
        )
    }

    /// Connection manager built from the harness config, opening mock connections.
    pub fn manager(&self) -> ConnectionManager {
        ConnectionManager::from_config(&self.config).with_connector(self.connector.clone())
    }

    /// Presigned connect URL for `credentials` at a fixed instant.
    pub fn signed_url(&self, credentials: &TemporaryCredentials) -> String {
        let at = UNIX_EPOCH + Duration::from_secs(1_704_067_200);
        presigned_url(&self.config.mqtt, &self.config.region, credentials, at)
            .expect("url signs")
    }
}
