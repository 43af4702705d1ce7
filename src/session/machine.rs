use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{AuthClient, Role};
use crate::error::{AuthError, AuthResult, SessionError};
use crate::identity::{Did, IdentityProofSource, WalletMode};
use super::state::SessionState;

/// Drives one user session through connect -> prove -> token -> roles.
///
/// Collaborators are injected; the machine owns the single live `SessionState`.
/// At most one attempt is in flight: `login` while `Connecting` is rejected.
pub struct SessionStateMachine {
    identity: Arc<dyn IdentityProofSource>,
    auth: Arc<dyn AuthClient>,
    state: watch::Sender<SessionState>,
}

// Returns the machine to Idle if the login future is dropped mid-attempt.
struct AttemptGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    attempt: Uuid,
    settled: bool,
}

impl AttemptGuard<'_> {
    fn settle(mut self, next: SessionState) {
        self.settled = true;
        self.state.send_replace(next);
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.settled { return; }
        let reset = self.state.send_if_modified(|s| {
            if !s.is_connecting() { return false; }
            *s = SessionState::Idle;
            true
        });
        if reset {
            warn!(target: "rolegate", attempt = %self.attempt, "session.login cancelled");
        }
    }
}

// Provider failures are classified by the phase they happened in.
fn connection_failure(err: AuthError) -> AuthError {
    match err {
        AuthError::ConnectionFailed(_) => err,
        other => AuthError::ConnectionFailed(other.to_string()),
    }
}

fn signing_failure(err: AuthError) -> AuthError {
    match err {
        AuthError::SigningFailed(_) => err,
        other => AuthError::SigningFailed(other.to_string()),
    }
}

// Role denial is only meaningful for /roles; a 401 on /login is a rejected proof.
fn token_failure(err: AuthError) -> AuthError {
    match err {
        AuthError::Unauthorized => AuthError::AuthRejected { status: 401 },
        other => other,
    }
}

impl SessionStateMachine {
    pub fn new(identity: Arc<dyn IdentityProofSource>, auth: Arc<dyn AuthClient>) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self { identity, auth, state }
    }

    pub fn state(&self) -> SessionState { self.state.borrow().clone() }

    /// Receiver that observes every transition, for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.state.subscribe() }

    /// Run one login attempt and return the state it settled in.
    ///
    /// All attempt failures are absorbed into `Unauthorized` or `Errored`; the only
    /// error is `AttemptInProgress` when another attempt is still connecting.
    pub async fn login(&self, mode: WalletMode) -> Result<SessionState, SessionError> {
        let entered = self.state.send_if_modified(|s| {
            if s.is_connecting() { return false; }
            *s = SessionState::Connecting;
            true
        });
        if !entered {
            warn!(target: "rolegate", mode = %mode, "session.login rejected: attempt in progress");
            return Err(SessionError::AttemptInProgress);
        }

        let attempt = Uuid::new_v4();
        let guard = AttemptGuard { state: &self.state, attempt, settled: false };
        info!(target: "rolegate", attempt = %attempt, mode = %mode, "session.login start");

        let next = match self.run_attempt(attempt, mode).await {
            Ok((did, roles)) => {
                info!(target: "rolegate", attempt = %attempt, did = %did, roles = roles.len(), "session.authenticated");
                SessionState::Authenticated { did, roles }
            }
            Err(err) => {
                let next = SessionState::from_failure(&err);
                warn!(target: "rolegate", attempt = %attempt, code = err.code_str(), state = next.name(), "session.login failed: {}", err);
                next
            }
        };
        guard.settle(next.clone());
        Ok(next)
    }

    async fn run_attempt(&self, attempt: Uuid, mode: WalletMode) -> AuthResult<(Did, Vec<Role>)> {
        let did = self.identity
            .establish_connection(mode.connect_options())
            .await
            .map_err(connection_failure)?;
        debug!(target: "rolegate", attempt = %attempt, did = %did, "session.connected");

        let proof = self.identity.create_identity_proof().await.map_err(signing_failure)?;
        let token = self.auth.login(proof).await.map_err(token_failure)?;
        debug!(target: "rolegate", attempt = %attempt, "session.token issued");

        // The token never outlives this attempt.
        let roles = self.auth.fetch_roles(&token).await?;
        Ok((did, roles))
    }

    /// Leave an authenticated session. Returns false, changing nothing, from any
    /// other state; in particular an in-flight attempt is never disturbed.
    pub fn logout(&self) -> bool {
        let left = self.state.send_if_modified(|s| {
            if !s.is_authenticated() { return false; }
            *s = SessionState::Idle;
            true
        });
        if left {
            info!(target: "rolegate", "session.logout");
        }
        left
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod machine_tests;
