//! Lambda authorizer that issues the user-pool session token.
//!
//! The authorizer is invoked synchronously with the configured JSON
//! payload, signed with the anonymous identity's base credentials. Its
//! response body must be a JSON object carrying `credentials.token`.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use serde::Deserialize;

use crate::error::{AuthError, AuthResult, from_sdk_error};
use tu_protocol::TemporaryCredentials;

/// Abstraction for invoking the authorizer function.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Invoke `function_name` with `payload`, returning the raw response body.
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        payload: &[u8],
    ) -> AuthResult<Vec<u8>>;
}

#[async_trait]
impl<T: Authorizer + ?Sized> Authorizer for &T {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        payload: &[u8],
    ) -> AuthResult<Vec<u8>> {
        (**self).invoke(credentials, function_name, payload).await
    }
}

/// Authorizer backed by AWS Lambda `Invoke`.
pub struct LambdaAuthorizer {
    config: SdkConfig,
}

impl LambdaAuthorizer {
    /// Create an authorizer from a shared SDK config. Credentials are
    /// supplied per invocation.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn client_for(&self, credentials: &TemporaryCredentials) -> LambdaClient {
        let provider = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_key,
            Some(credentials.session_token.clone()),
            None,
            "cognito-identity",
        );
        let conf = aws_sdk_lambda::config::Builder::from(&self.config)
            .credentials_provider(provider)
            .build();
        LambdaClient::from_conf(conf)
    }
}

#[async_trait]
impl Authorizer for LambdaAuthorizer {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        payload: &[u8],
    ) -> AuthResult<Vec<u8>> {
        let response = self
            .client_for(credentials)
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| from_sdk_error(e, AuthError::Authorizer))?;

        let body = response
            .payload()
            .map(|blob| blob.as_ref().to_vec())
            .unwrap_or_default();

        if let Some(kind) = response.function_error() {
            return Err(AuthError::Authorizer(format!(
                "{function_name} failed ({kind}): {}",
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(body)
    }
}

// ── Response parsing ──────────────────────────────────────────

/// Expected JSON shape of the authorizer response.
#[derive(Debug, Deserialize)]
struct AuthorizerResponse {
    credentials: Option<AuthorizerCredentials>,
}

#[derive(Debug, Deserialize)]
struct AuthorizerCredentials {
    token: Option<String>,
}

/// Extract `credentials.token` from an authorizer response body.
///
/// No fallback: a body that is not a JSON object, a missing key or a
/// non-string token is an error.
pub fn extract_token(body: &[u8]) -> AuthResult<String> {
    let response: AuthorizerResponse =
        serde_json::from_slice(body).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

    response
        .credentials
        .and_then(|c| c.token)
        .ok_or(AuthError::MissingToken)
}
