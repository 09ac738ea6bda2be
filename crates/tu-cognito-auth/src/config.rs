use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::Deserialize;

/// Values the credential broker needs, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// AWS region of the identity pool, user pool and authorizer (e.g. `us-east-1`).
    pub region: String,
    /// Cognito identity pool id (e.g. `us-east-1:0000-...`).
    pub identity_pool_id: String,
    /// Cognito user pool id whose tokens the identity pool trusts.
    pub user_pool: String,
    /// Name or ARN of the Lambda authorizer.
    pub function_name: String,
    /// JSON object sent as the authorizer request body.
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Load an SDK config for `region` without any credentials provider.
///
/// Cognito `GetId` / `GetCredentialsForIdentity` accept unsigned requests;
/// clients that need signing override the provider on their own config.
pub async fn anonymous_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .no_credentials()
        .load()
        .await
}
