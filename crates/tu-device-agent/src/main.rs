//! Thing-update device agent.
//!
//! Authenticates through Cognito and the authorizer Lambda, connects to
//! AWS IoT over WebSockets, and logs every `thing-update/#` message until
//! interrupted.

use tracing_subscriber::EnvFilter;

use tu_cognito_auth::CredentialBroker;
use tu_device_agent::config::AgentConfig;
use tu_device_agent::lifecycle;
use tu_device_agent::manager::ConnectionManager;

const DEFAULT_CONFIG_PATH: &str = "/etc/thing-update/agent.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "tu-device-agent starting"
    );

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = AgentConfig::from_file(&config_path)?;
    tracing::info!(
        region = %config.region,
        endpoint = %config.mqtt.endpoint,
        client_id = %config.mqtt.client_id,
        device_version = config.device.version,
        "config loaded"
    );

    // ── Credential broker + connection manager ──────────────────
    let broker = CredentialBroker::from_aws(config.broker_config()).await;
    let mut manager = ConnectionManager::from_config(&config);
    tracing::info!(variant = %manager.variant(), "protocol variant selected");

    if let Err(e) = lifecycle::setup(&broker, &mut manager).await {
        tracing::error!(error = %e, "setup failed");
        if let Err(close_err) = manager.close().await {
            tracing::warn!(error = %close_err, "close after failed setup");
        }
        return Err(e.into());
    }

    tracing::info!("tu-device-agent ready");

    // Graceful shutdown on SIGINT
    lifecycle::serve(&mut manager, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
    })
    .await?;

    tracing::info!("tu-device-agent stopped");
    Ok(())
}
