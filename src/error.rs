//! Error taxonomy for the login/authorization flow.
//! Every failure of an attempt is one of the `AuthError` variants. The session
//! machine absorbs them into state, so only `SessionError` ever reaches a caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wallet handshake aborted or rejected.
    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),
    /// User declined to sign, or proof generation errored.
    #[error("identity proof signing failed: {0}")]
    SigningFailed(String),
    /// Backend refused the identity proof (invalid or expired claim).
    #[error("backend rejected identity proof: HTTP {status}")]
    AuthRejected { status: u16 },
    /// Proof was accepted but the subject holds no accepted role.
    #[error("backend denied role access")]
    Unauthorized,
    /// Transport failure, timeout, unexpected status or malformed body.
    #[error("network error: {0}")]
    Network(String),
}

/// Underlying cause carried by `SessionState::Errored`, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConnectionFailed,
    SigningFailed,
    AuthRejected,
    Network,
}

impl FailureKind {
    pub fn code_str(&self) -> &'static str {
        match self {
            FailureKind::ConnectionFailed => "connection_failed",
            FailureKind::SigningFailed => "signing_failed",
            FailureKind::AuthRejected => "auth_rejected",
            FailureKind::Network => "network_error",
        }
    }
}

impl AuthError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "unauthorized",
            other => other.kind().map(|k| k.code_str()).unwrap_or("unknown"),
        }
    }

    /// Failure bucket for the `Errored` state. `Unauthorized` has its own state and
    /// therefore no kind.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            AuthError::ConnectionFailed(_) => Some(FailureKind::ConnectionFailed),
            AuthError::SigningFailed(_) => Some(FailureKind::SigningFailed),
            AuthError::AuthRejected { .. } => Some(FailureKind::AuthRejected),
            AuthError::Network(_) => Some(FailureKind::Network),
            AuthError::Unauthorized => None,
        }
    }

    pub fn network<S: Into<String>>(msg: S) -> Self { AuthError::Network(msg.into()) }
    pub fn connection<S: Into<String>>(msg: S) -> Self { AuthError::ConnectionFailed(msg.into()) }
    pub fn signing<S: Into<String>>(msg: S) -> Self { AuthError::SigningFailed(msg.into()) }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            AuthError::Network(format!("malformed response body: {err}"))
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

/// Errors returned by the session machine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a login attempt is already in progress")]
    AttemptInProgress,
}

pub type AuthResult<T> = Result<T, AuthError>;
