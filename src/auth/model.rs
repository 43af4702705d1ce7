use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityProof;

/// Role claim held by the authenticated subject. `namespace` is unique among the
/// roles returned for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub namespace: String,
}

impl Role {
    pub fn new<S: Into<String>>(name: S, namespace: S) -> Self {
        Self { name: name.into(), namespace: namespace.into() }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.name, self.namespace)
    }
}

/// Bearer credential issued by the backend for one login attempt.
///
/// Held only in memory and never cached across attempts; `Debug` output is
/// redacted so it cannot leak through logs.
#[derive(PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn parse<S: Into<String>>(s: S) -> Option<Self> {
        let s = s.into();
        if s.trim().is_empty() { None } else { Some(SessionToken(s)) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("SessionToken(<redacted>)") }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub claim: &'a IdentityProof,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginReply {
    pub token: String,
}
