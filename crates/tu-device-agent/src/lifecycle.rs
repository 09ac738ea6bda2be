//! Startup and shutdown sequencing.
//!
//! Startup is strictly sequential: resolve credentials, then connect and
//! subscribe. Shutdown closes the connection once the signal fires.

use std::future::Future;

use tu_cognito_auth::{Authorizer, CredentialBroker, IdentityFederation};

use crate::error::AgentResult;
use crate::manager::ConnectionManager;

/// Resolve broker credentials and open the connection.
///
/// On failure the manager may hold a connection that failed to subscribe;
/// callers still run [`ConnectionManager::close`].
pub async fn setup<F, A>(
    broker: &CredentialBroker<F, A>,
    manager: &mut ConnectionManager,
) -> AgentResult<()>
where
    F: IdentityFederation,
    A: Authorizer,
{
    let credentials = broker.credentials().await?;
    tracing::info!(
        expiration = ?credentials.expiration,
        "broker credentials resolved"
    );

    manager.connect(&credentials).await?;
    tracing::info!(status = %manager.status(), "subscribed to thing updates");
    Ok(())
}

/// Wait for `shutdown`, then close the connection.
pub async fn serve<S>(manager: &mut ConnectionManager, shutdown: S) -> AgentResult<()>
where
    S: Future<Output = ()>,
{
    shutdown.await;
    tracing::info!("shutdown signal received");
    manager.close().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::manager::ProtocolVariant;
    use crate::mock::MockConnector;
    use std::sync::Arc;
    use tu_cognito_auth::{AuthError, BrokerConfig, MockAuthorizer, MockFederation};
    use tu_mqtt_channel::{ConnectionStatus, MockChannel, MqttConfig, MqttError};

    fn broker_config() -> BrokerConfig {
        BrokerConfig {
            region: "us-east-1".into(),
            identity_pool_id: "us-east-1:pool".into(),
            user_pool: "us-east-1_Users".into(),
            function_name: "authorizer".into(),
            payload: serde_json::Map::new(),
        }
    }

    fn manager(endpoint: &str) -> ConnectionManager {
        ConnectionManager::new(
            ProtocolVariant::Classic,
            MqttConfig::new(endpoint, "sensor-042"),
            "us-east-1",
        )
    }

    #[tokio::test]
    async fn auth_failure_leaves_manager_unconnected() {
        let federation = MockFederation::new();
        federation.fail_next_with(AuthError::Connectivity("no route to host".into()));
        let authorizer = MockAuthorizer::with_token("session-token");
        let broker = CredentialBroker::new(&federation, &authorizer, broker_config());
        let mut manager = manager("a1b2c3-ats.iot.us-east-1.amazonaws.com");

        let err = setup(&broker, &mut manager).await.unwrap_err();
        assert!(matches!(err, AgentError::Auth(AuthError::Connectivity(_))));
        assert!(authorizer.invocations().is_empty());
        assert_eq!(manager.status(), ConnectionStatus::Unconnected);
        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_runs_after_broker_completes() {
        let federation = MockFederation::new();
        let authorizer = MockAuthorizer::with_token("session-token");
        let broker = CredentialBroker::new(&federation, &authorizer, broker_config());
        let mut manager = manager("");

        let err = setup(&broker, &mut manager).await.unwrap_err();
        assert!(matches!(err, AgentError::Mqtt(MqttError::Config(_))));
        assert_eq!(federation.calls().len(), 4);
        assert_eq!(authorizer.invocations().len(), 1);
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn serve_closes_on_shutdown() {
        let mut manager = manager("a1b2c3-ats.iot.us-east-1.amazonaws.com");
        serve(&mut manager, async {}).await.unwrap();
        assert_eq!(manager.status(), ConnectionStatus::Unconnected);
    }

    #[tokio::test]
    async fn serve_closes_open_connection() {
        let federation = MockFederation::new();
        let authorizer = MockAuthorizer::with_token("session-token");
        let broker = CredentialBroker::new(&federation, &authorizer, broker_config());
        let channel = Arc::new(MockChannel::new());
        let mut manager = manager("a1b2c3-ats.iot.us-east-1.amazonaws.com")
            .with_connector(MockConnector::new(channel.clone()));

        setup(&broker, &mut manager).await.unwrap();
        assert_eq!(manager.status(), ConnectionStatus::Connected);

        serve(&mut manager, async {}).await.unwrap();
        assert!(!manager.is_connected());
        assert_eq!(channel.disconnect_count(), 1);
    }
}
