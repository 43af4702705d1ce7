//! Backend authorization service client: proof-for-token exchange and
//! bearer-scoped role retrieval.

mod model;
mod client;
mod http;

pub use model::{Role, SessionToken};
pub use client::AuthClient;
pub use http::HttpAuthClient;
pub(crate) use http::http_base;
