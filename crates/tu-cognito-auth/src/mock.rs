//! Mock identity federation and authorizer for testing without AWS.
//!
//! Both mocks record every call for assertion in tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::authorizer::Authorizer;
use crate::error::{AuthError, AuthResult};
use crate::federation::{IdentityFederation, Logins};
use tu_protocol::TemporaryCredentials;

/// A recorded federation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FederationCall {
    GetId {
        identity_pool_id: String,
        logins: Option<Logins>,
    },
    GetCredentials {
        identity_id: String,
        logins: Option<Logins>,
    },
}

/// Mock implementation of the `IdentityFederation` trait.
///
/// Calls without logins resolve to the anonymous identity, calls with
/// logins to the authenticated one.
pub struct MockFederation {
    calls: Mutex<Vec<FederationCall>>,
    next_error: Mutex<Option<AuthError>>,
}

impl MockFederation {
    pub const ANONYMOUS_ID: &'static str = "us-east-1:anon-0000";
    pub const AUTHENTICATED_ID: &'static str = "us-east-1:auth-0001";

    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    pub fn anonymous_credentials() -> TemporaryCredentials {
        TemporaryCredentials::new("ASIAANONYMOUS", "anon-secret", "anon-session")
    }

    pub fn authenticated_credentials() -> TemporaryCredentials {
        TemporaryCredentials::new("ASIAAUTHENTICATED", "auth-secret", "auth-session")
    }

    /// Make the next call fail with `err`.
    pub fn fail_next_with(&self, err: AuthError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    /// Get all recorded calls, in order.
    pub fn calls(&self) -> Vec<FederationCall> {
        self.calls.lock().unwrap().clone()
    }

    fn take_error(&self) -> AuthResult<()> {
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MockFederation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityFederation for MockFederation {
    async fn get_id(&self, identity_pool_id: &str, logins: Option<&Logins>) -> AuthResult<String> {
        self.calls.lock().unwrap().push(FederationCall::GetId {
            identity_pool_id: identity_pool_id.to_string(),
            logins: logins.cloned(),
        });
        self.take_error()?;

        Ok(match logins {
            None => Self::ANONYMOUS_ID.to_string(),
            Some(_) => Self::AUTHENTICATED_ID.to_string(),
        })
    }

    async fn get_credentials_for_identity(
        &self,
        identity_id: &str,
        logins: Option<&Logins>,
    ) -> AuthResult<TemporaryCredentials> {
        self.calls.lock().unwrap().push(FederationCall::GetCredentials {
            identity_id: identity_id.to_string(),
            logins: logins.cloned(),
        });
        self.take_error()?;

        Ok(match logins {
            None => Self::anonymous_credentials(),
            Some(_) => Self::authenticated_credentials(),
        })
    }
}

/// A recorded authorizer invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub credentials: TemporaryCredentials,
    pub function_name: String,
    pub payload: Vec<u8>,
}

/// Mock implementation of the `Authorizer` trait returning a fixed body.
pub struct MockAuthorizer {
    response: Mutex<Option<AuthResult<Vec<u8>>>>,
    body: Vec<u8>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockAuthorizer {
    /// Respond with `{"credentials":{"token":<token>}}`.
    pub fn with_token(token: &str) -> Self {
        let body = serde_json::to_vec(&serde_json::json!({ "credentials": { "token": token } }))
            .unwrap_or_default();
        Self::with_body(body)
    }

    /// Respond with a raw body.
    pub fn with_body(body: Vec<u8>) -> Self {
        Self {
            response: Mutex::new(None),
            body,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first invocation with `err`.
    pub fn failing(err: AuthError) -> Self {
        Self {
            response: Mutex::new(Some(Err(err))),
            body: Vec::new(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded invocations.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        payload: &[u8],
    ) -> AuthResult<Vec<u8>> {
        self.invocations.lock().unwrap().push(Invocation {
            credentials: credentials.clone(),
            function_name: function_name.to_string(),
            payload: payload.to_vec(),
        });

        match self.response.lock().unwrap().take() {
            Some(result) => result,
            None => Ok(self.body.clone()),
        }
    }
}
