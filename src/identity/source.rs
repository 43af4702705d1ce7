use async_trait::async_trait;

use crate::error::AuthResult;
use super::did::{ConnectOptions, Did, IdentityProof};

/// Capability interface over a wallet-backed identity provider.
///
/// `establish_connection` may suspend for as long as the user takes to approve
/// the request in their wallet; there is no cancellation API beyond dropping the
/// future. Implementations report handshake failures as `ConnectionFailed` and
/// proof failures as `SigningFailed`.
#[async_trait]
pub trait IdentityProofSource: Send + Sync {
    async fn establish_connection(&self, options: ConnectOptions) -> AuthResult<Did>;

    /// Sign a freshness-bound challenge. Only valid after a successful connection.
    async fn create_identity_proof(&self) -> AuthResult<IdentityProof>;
}
