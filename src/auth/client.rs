use async_trait::async_trait;

use crate::error::AuthResult;
use crate::identity::IdentityProof;
use super::model::{Role, SessionToken};

/// Capability interface over the backend authorization service.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Exchange an identity proof for a bearer token.
    /// Fails with `AuthRejected` or `Network`.
    async fn login(&self, proof: IdentityProof) -> AuthResult<SessionToken>;

    /// Fetch the caller's validated roles. A 401 is reported as `Unauthorized`,
    /// every other failure as `Network`.
    async fn fetch_roles(&self, token: &SessionToken) -> AuthResult<Vec<Role>>;
}
