//! Session state machine: sequences wallet connection, proof exchange and role
//! retrieval, and exposes the single live state to the presentation layer.

mod state;
mod machine;

pub use state::{SessionState, Remediation};
pub use machine::SessionStateMachine;
