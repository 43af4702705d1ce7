//! Identity side of the login flow: wallet connection and identity proofs.
//! Keep the public surface thin and split implementation across sub-modules.

mod did;
mod source;
mod dev;

pub use did::{Did, IdentityProof, WalletMode, ConnectOptions};
pub use source::IdentityProofSource;
pub use dev::DevIdentityProvider;
