use serde::Serialize;

use crate::auth::Role;
use crate::error::{AuthError, FailureKind};
use crate::identity::Did;

/// Current position of the login protocol. Exactly one is live per machine; the
/// subject's DID and roles exist only inside `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Authenticated { did: Did, roles: Vec<Role> },
    /// Proof accepted, but the subject holds no accepted role.
    Unauthorized,
    /// Any other failure. `kind` is diagnostic; presentation treats all kinds alike.
    Errored { kind: FailureKind },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::Unauthorized => "unauthorized",
            SessionState::Errored { .. } => "errored",
        }
    }

    pub fn did(&self) -> Option<&Did> {
        match self {
            SessionState::Authenticated { did, .. } => Some(did),
            _ => None,
        }
    }

    pub fn roles(&self) -> &[Role] {
        match self {
            SessionState::Authenticated { roles, .. } => roles,
            _ => &[],
        }
    }

    pub fn is_connecting(&self) -> bool { matches!(self, SessionState::Connecting) }
    pub fn is_authenticated(&self) -> bool { matches!(self, SessionState::Authenticated { .. }) }

    /// Classify a failed attempt. Only a role-access denial yields `Unauthorized`.
    pub(crate) fn from_failure(err: &AuthError) -> Self {
        match err.kind() {
            None => SessionState::Unauthorized,
            Some(kind) => SessionState::Errored { kind },
        }
    }

    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            SessionState::Unauthorized => Some(Remediation::SeekEnrolment),
            SessionState::Errored { .. } => Some(Remediation::RetrySignature),
            SessionState::Authenticated { roles, .. } if roles.is_empty() => Some(Remediation::NoRolesIssued),
            _ => None,
        }
    }
}

/// What the user should do next, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    /// Retry and accept the signing requests.
    RetrySignature,
    /// Obtain the necessary role claim, typically via the enrolment link.
    SeekEnrolment,
    /// Logged in, but no role has been issued yet.
    NoRolesIssued,
}

impl Remediation {
    pub fn message(&self) -> &'static str {
        match self {
            Remediation::RetrySignature => {
                "Error occurred with login. If you rejected the signing requests, please try again and accept. \
                 If this is your first time logging in, your account may need a small amount of funds to create a DID document."
            }
            Remediation::SeekEnrolment => {
                "Unauthorized login response. Please ensure that you have the necessary role claim."
            }
            Remediation::NoRolesIssued => {
                "You do not have any issued role at the moment. Search for apps and organizations to enrol."
            }
        }
    }

    /// Whether an enrolment link, when configured, should be offered.
    pub fn offers_enrolment(&self) -> bool {
        matches!(self, Remediation::SeekEnrolment | Remediation::NoRolesIssued)
    }
}
