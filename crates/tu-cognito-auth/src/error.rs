//! Credential broker error types.

use aws_sdk_cognitoidentity::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

/// Errors that can occur while resolving device credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity service or authorizer unreachable (dispatch failure, timeout).
    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("identity federation error: {0}")]
    Identity(String),

    #[error("authorizer error: {0}")]
    Authorizer(String),

    #[error("malformed authorizer response: {0}")]
    MalformedResponse(String),

    #[error("authorizer response has no credentials.token")]
    MissingToken,

    #[error("identity service returned no {0}")]
    MissingCredentials(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for credential broker results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Map an AWS SDK error, splitting transport failures from service errors.
pub(crate) fn from_sdk_error<E, R>(
    err: SdkError<E, R>,
    service: impl FnOnce(String) -> AuthError,
) -> AuthError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => AuthError::Connectivity(detail),
        _ => service(detail),
    }
}
