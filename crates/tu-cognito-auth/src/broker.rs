//! Credential broker: the fixed anonymous → token → authenticated sequence.

use crate::authorizer::{Authorizer, LambdaAuthorizer, extract_token};
use crate::config::{BrokerConfig, anonymous_sdk_config};
use crate::error::{AuthError, AuthResult};
use crate::federation::{CognitoFederation, IdentityFederation, Logins, provider_login_key};
use tu_protocol::TemporaryCredentials;

/// Resolves the device's broker credentials.
///
/// Runs once at startup. No retries: the first failure is returned.
pub struct CredentialBroker<F, A> {
    federation: F,
    authorizer: A,
    config: BrokerConfig,
}

impl CredentialBroker<CognitoFederation, LambdaAuthorizer> {
    /// Build a broker backed by Cognito and Lambda in `config.region`.
    pub async fn from_aws(config: BrokerConfig) -> Self {
        let sdk_config = anonymous_sdk_config(&config.region).await;
        Self::new(
            CognitoFederation::from_sdk_config(&sdk_config),
            LambdaAuthorizer::new(&sdk_config),
            config,
        )
    }
}

impl<F: IdentityFederation, A: Authorizer> CredentialBroker<F, A> {
    pub fn new(federation: F, authorizer: A, config: BrokerConfig) -> Self {
        Self {
            federation,
            authorizer,
            config,
        }
    }

    /// Resolve authenticated temporary credentials.
    pub async fn credentials(&self) -> AuthResult<TemporaryCredentials> {
        let base = self.base_credentials().await?;
        let token = self.session_token(&base).await?;
        self.logins_credentials(&token).await
    }

    /// Credentials for an anonymous identity in the pool.
    async fn base_credentials(&self) -> AuthResult<TemporaryCredentials> {
        let identity_id = self
            .federation
            .get_id(&self.config.identity_pool_id, None)
            .await?;
        tracing::debug!(identity_id = %identity_id, "anonymous identity resolved");

        self.federation
            .get_credentials_for_identity(&identity_id, None)
            .await
    }

    /// Invoke the authorizer and pull the session token out of its response.
    async fn session_token(&self, base: &TemporaryCredentials) -> AuthResult<String> {
        let payload = serde_json::to_vec(&self.config.payload)
            .map_err(|e| AuthError::Serialization(e.to_string()))?;

        let body = self
            .authorizer
            .invoke(base, &self.config.function_name, &payload)
            .await?;

        let token = extract_token(&body)?;
        tracing::debug!(function = %self.config.function_name, "authorizer issued session token");
        Ok(token)
    }

    /// Exchange the session token for credentials scoped to the
    /// authenticated identity.
    async fn logins_credentials(&self, token: &str) -> AuthResult<TemporaryCredentials> {
        let mut logins = Logins::new();
        logins.insert(
            provider_login_key(&self.config.region, &self.config.user_pool),
            token.to_string(),
        );

        let identity_id = self
            .federation
            .get_id(&self.config.identity_pool_id, Some(&logins))
            .await?;

        let credentials = self
            .federation
            .get_credentials_for_identity(&identity_id, Some(&logins))
            .await?;

        tracing::info!(
            identity_id = %identity_id,
            expiration = ?credentials.expiration,
            "authenticated credentials issued"
        );
        Ok(credentials)
    }
}
