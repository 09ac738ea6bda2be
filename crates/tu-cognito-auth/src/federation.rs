//! Cognito identity federation via `GetId` and `GetCredentialsForIdentity`.
//!
//! Both calls are unauthenticated: the client is built without a
//! credentials provider so requests go out unsigned.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cognitoidentity::Client as CognitoClient;
use aws_sdk_cognitoidentity::types::Credentials;
use chrono::{DateTime, Utc};

use crate::error::{AuthError, AuthResult, from_sdk_error};
use tu_protocol::TemporaryCredentials;

/// Identity provider name → token, as sent in the Cognito `Logins` map.
pub type Logins = HashMap<String, String>;

/// Provider key for a Cognito user pool in the `Logins` map.
pub fn provider_login_key(region: &str, user_pool: &str) -> String {
    format!("cognito-idp.{region}.amazonaws.com/{user_pool}")
}

// ── Federation trait ──────────────────────────────────────────

/// Abstraction over the identity-federation service.
///
/// Enables mocking in tests without AWS.
#[async_trait]
pub trait IdentityFederation: Send + Sync {
    /// Resolve an identity id in the pool. `None` logins requests an
    /// anonymous (unauthenticated) identity.
    async fn get_id(&self, identity_pool_id: &str, logins: Option<&Logins>) -> AuthResult<String>;

    /// Issue temporary credentials for a previously resolved identity.
    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: Option<&Logins>,
    ) -> AuthResult<TemporaryCredentials>;
}

#[async_trait]
impl<T: IdentityFederation + ?Sized> IdentityFederation for &T {
    async fn get_id(&self, identity_pool_id: &str, logins: Option<&Logins>) -> AuthResult<String> {
        (**self).get_id(identity_pool_id, logins).await
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: Option<&Logins>,
    ) -> AuthResult<TemporaryCredentials> {
        (**self)
            .get_credentials_for_identity(identity_id, logins)
            .await
    }
}

// ── CognitoFederation ─────────────────────────────────────────

/// Identity federation backed by Amazon Cognito.
pub struct CognitoFederation {
    client: CognitoClient,
}

impl CognitoFederation {
    /// Create a federation client with a pre-built Cognito client.
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }

    /// Build from a shared SDK config. The config must carry no
    /// credentials provider (see [`crate::config::anonymous_sdk_config`]).
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(CognitoClient::new(config))
    }
}

#[async_trait]
impl IdentityFederation for CognitoFederation {
    async fn get_id(&self, identity_pool_id: &str, logins: Option<&Logins>) -> AuthResult<String> {
        let output = self
            .client
            .get_id()
            .identity_pool_id(identity_pool_id)
            .set_logins(logins.cloned())
            .send()
            .await
            .map_err(|e| from_sdk_error(e, AuthError::Identity))?;

        output
            .identity_id()
            .map(str::to_string)
            .ok_or(AuthError::MissingCredentials("identity id"))
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: Option<&Logins>,
    ) -> AuthResult<TemporaryCredentials> {
        let output = self
            .client
            .get_credentials_for_identity()
            .identity_id(identity_id)
            .set_logins(logins.cloned())
            .send()
            .await
            .map_err(|e| from_sdk_error(e, AuthError::Identity))?;

        let creds = output
            .credentials()
            .ok_or(AuthError::MissingCredentials("credentials"))?;

        temporary_credentials(creds)
    }
}

/// Convert the SDK credential shape; every key part is required.
fn temporary_credentials(creds: &Credentials) -> AuthResult<TemporaryCredentials> {
    let access_key_id = creds
        .access_key_id()
        .ok_or(AuthError::MissingCredentials("access key id"))?;
    let secret_key = creds
        .secret_key()
        .ok_or(AuthError::MissingCredentials("secret key"))?;
    let session_token = creds
        .session_token()
        .ok_or(AuthError::MissingCredentials("session token"))?;

    let credentials = TemporaryCredentials::new(access_key_id, secret_key, session_token);
    let expiration = creds
        .expiration()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()));

    Ok(match expiration {
        Some(expiration) => credentials.with_expiration(expiration),
        None => credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_key_matches_user_pool_provider() {
        assert_eq!(
            provider_login_key("us-east-1", "pool123"),
            "cognito-idp.us-east-1.amazonaws.com/pool123"
        );
    }

    #[test]
    fn login_key_keeps_region_and_pool_verbatim() {
        assert_eq!(
            provider_login_key("ap-northeast-2", "ap-northeast-2_AbCdEf123"),
            "cognito-idp.ap-northeast-2.amazonaws.com/ap-northeast-2_AbCdEf123"
        );
    }

    fn sdk_credentials() -> aws_sdk_cognitoidentity::types::builders::CredentialsBuilder {
        Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_key("secret")
            .session_token("token")
    }

    #[test]
    fn sdk_credentials_keep_expiration() {
        let creds = temporary_credentials(
            &sdk_credentials()
                .expiration(aws_sdk_cognitoidentity::primitives::DateTime::from_secs(1_704_067_200))
                .build(),
        )
        .unwrap();

        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(
            creds.expiration,
            DateTime::<Utc>::from_timestamp(1_704_067_200, 0)
        );
    }

    #[test]
    fn sdk_credentials_without_expiration() {
        let creds = temporary_credentials(&sdk_credentials().build()).unwrap();
        assert_eq!(creds.expiration, None);
    }

    #[test]
    fn sdk_credentials_require_session_token() {
        let creds = Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_key("secret")
            .build();
        assert!(matches!(
            temporary_credentials(&creds),
            Err(AuthError::MissingCredentials("session token"))
        ));
    }
}
