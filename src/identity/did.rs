use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decentralized identifier of the connected subject. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    pub fn parse<S: Into<String>>(s: S) -> Option<Self> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() { return None; }
        Some(Did(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for Did {
    type Error = &'static str;
    fn try_from(s: String) -> Result<Self, Self::Error> { Did::parse(s).ok_or("empty DID") }
}

impl From<Did> for String {
    fn from(d: Did) -> Self { d.0 }
}

/// Provider-signed proof of control over a DID at a point in time.
///
/// The structure is opaque to this crate and forwarded verbatim as the `claim`
/// of the backend login call. Not `Clone`: a proof is consumed by
/// exactly one login request.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityProof(serde_json::Value);

impl IdentityProof {
    pub fn from_value(v: serde_json::Value) -> Self { IdentityProof(v) }
    pub fn as_value(&self) -> &serde_json::Value { &self.0 }
    pub fn into_value(self) -> serde_json::Value { self.0 }
}

/// How the wallet session is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletMode {
    /// In-browser extension wallet (e.g. MetaMask).
    Extension,
    /// Relay / QR pairing with a remote wallet (e.g. WalletConnect).
    Relay,
}

impl WalletMode {
    pub fn connect_options(self) -> ConnectOptions {
        ConnectOptions { use_extension_wallet: matches!(self, WalletMode::Extension) }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletMode::Extension => "extension",
            WalletMode::Relay => "relay",
        }
    }
}

impl fmt::Display for WalletMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for WalletMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extension" | "metamask" => Ok(WalletMode::Extension),
            "relay" | "walletconnect" | "wallet_connect" | "qr" => Ok(WalletMode::Relay),
            other => Err(format!("unknown wallet mode '{}'", other)),
        }
    }
}

/// Options handed to the identity provider's connection handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    pub use_extension_wallet: bool,
}
