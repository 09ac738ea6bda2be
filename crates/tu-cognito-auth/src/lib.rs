//! Credential broker for AWS IoT device authentication.
//!
//! Exchanges an anonymous Cognito identity for a session token issued
//! by a Lambda authorizer, then trades that token for authenticated
//! temporary credentials:
//! - `IdentityFederation` / `Authorizer` traits (mockable in tests)
//! - `CognitoFederation` / `LambdaAuthorizer` backed by the AWS SDK
//! - `CredentialBroker` running the fixed three-step sequence
//! - `MockFederation` / `MockAuthorizer` for testing without AWS

pub mod authorizer;
pub mod broker;
pub mod config;
pub mod error;
pub mod federation;
pub mod mock;

// Re-exports for convenience.
pub use authorizer::{Authorizer, LambdaAuthorizer, extract_token};
pub use broker::CredentialBroker;
pub use config::BrokerConfig;
pub use error::{AuthError, AuthResult};
pub use federation::{CognitoFederation, IdentityFederation, Logins, provider_login_key};
pub use mock::{MockAuthorizer, MockFederation};
