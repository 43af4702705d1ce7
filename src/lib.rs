pub mod error;
pub mod config;
pub mod identity;
pub mod auth;
pub mod session;

pub use error::{AuthError, FailureKind, SessionError};
pub use config::Config;
pub use identity::{Did, IdentityProof, IdentityProofSource, WalletMode, DevIdentityProvider};
pub use auth::{AuthClient, HttpAuthClient, Role, SessionToken};
pub use session::{SessionState, SessionStateMachine, Remediation};
