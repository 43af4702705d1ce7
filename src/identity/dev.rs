use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use super::did::{ConnectOptions, Did, IdentityProof};
use super::source::IdentityProofSource;

const DEFAULT_PROOF_TTL_SECS: i64 = 300;

fn gen_nonce() -> AuthResult<String> {
    // 128-bit random nonce, base64url without padding
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::signing(format!("nonce generation failed: {e}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// In-process identity provider for local development and tests.
///
/// Resolves a fixed DID and produces unsigned proofs of the shape
/// `{ did, nonce, issuedAt, expiresAt }`. Only development backends accept them.
pub struct DevIdentityProvider {
    did: Did,
    reject_connection: bool,
    proof_ttl: Duration,
    connected: Mutex<Option<Did>>,
}

impl DevIdentityProvider {
    pub fn new(did: Did) -> Self {
        Self {
            did,
            reject_connection: false,
            proof_ttl: Duration::seconds(DEFAULT_PROOF_TTL_SECS),
            connected: Mutex::new(None),
        }
    }

    /// Simulate a user who declines every connection request.
    pub fn rejecting(mut self) -> Self { self.reject_connection = true; self }

    pub fn with_proof_ttl(mut self, ttl: Duration) -> Self { self.proof_ttl = ttl; self }

    pub fn is_connected(&self) -> bool { self.connected.lock().is_some() }
}

#[async_trait]
impl IdentityProofSource for DevIdentityProvider {
    async fn establish_connection(&self, options: ConnectOptions) -> AuthResult<Did> {
        debug!(target: "rolegate", extension = options.use_extension_wallet, did = %self.did, "dev_provider.connect");
        if self.reject_connection {
            *self.connected.lock() = None;
            return Err(AuthError::connection("user rejected the connection request"));
        }
        *self.connected.lock() = Some(self.did.clone());
        Ok(self.did.clone())
    }

    async fn create_identity_proof(&self) -> AuthResult<IdentityProof> {
        let Some(did) = self.connected.lock().clone() else {
            return Err(AuthError::signing("no wallet connection established"));
        };
        let now = Utc::now();
        let proof = serde_json::json!({
            "did": did.as_str(),
            "nonce": gen_nonce()?,
            "issuedAt": now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "expiresAt": (now + self.proof_ttl).to_rfc3339_opts(SecondsFormat::Secs, true),
        });
        Ok(IdentityProof::from_value(proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn did() -> Did { Did::parse("did:ethr:0xABC").unwrap() }

    #[tokio::test]
    async fn proof_requires_connection() {
        let p = DevIdentityProvider::new(did());
        let err = p.create_identity_proof().await.unwrap_err();
        assert!(matches!(err, AuthError::SigningFailed(_)));
    }

    #[tokio::test]
    async fn proof_is_fresh_per_call() {
        let p = DevIdentityProvider::new(did()).with_proof_ttl(Duration::seconds(60));
        let resolved = p.establish_connection(ConnectOptions::default()).await.unwrap();
        assert_eq!(resolved, did());
        let a = p.create_identity_proof().await.unwrap().into_value();
        let b = p.create_identity_proof().await.unwrap().into_value();
        assert_eq!(a["did"], "did:ethr:0xABC");
        assert_ne!(a["nonce"], b["nonce"]);
        let issued = DateTime::parse_from_rfc3339(a["issuedAt"].as_str().unwrap()).unwrap();
        let expires = DateTime::parse_from_rfc3339(a["expiresAt"].as_str().unwrap()).unwrap();
        assert_eq!((expires - issued).num_seconds(), 60);
    }

    #[tokio::test]
    async fn rejecting_provider_fails_connection() {
        let p = DevIdentityProvider::new(did()).rejecting();
        let err = p.establish_connection(ConnectOptions { use_extension_wallet: true }).await.unwrap_err();
        assert!(matches!(err, AuthError::ConnectionFailed(_)));
        assert!(!p.is_connected());
    }
}
