//! Runtime configuration, read from `ROLEGATE_*` environment variables.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Url;

use crate::auth::http_base;
use crate::identity::WalletMode;

pub const ENV_BACKEND_URL: &str = "ROLEGATE_BACKEND_URL";
pub const ENV_ENROLMENT_URL: &str = "ROLEGATE_ENROLMENT_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ROLEGATE_REQUEST_TIMEOUT_SECS";
pub const ENV_WALLET_MODE: &str = "ROLEGATE_WALLET_MODE";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend authorization service; always ends with `/`.
    pub backend_url: Url,
    /// Enrolment deep link offered when the user lacks a role. Never generated here.
    pub enrolment_url: Option<String>,
    /// Upper bound for each backend request.
    pub request_timeout: Duration,
    /// Wallet mode used when a login does not name one.
    pub wallet_mode: WalletMode,
}

impl Config {
    pub fn new(backend_url: &str) -> Result<Self> {
        Ok(Self {
            backend_url: http_base(backend_url)?,
            enrolment_url: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            wallet_mode: WalletMode::Relay,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = get(ENV_BACKEND_URL).ok_or_else(|| anyhow!("{} is not set", ENV_BACKEND_URL))?;
        let mut cfg = Self::new(&backend).with_context(|| format!("invalid {}", ENV_BACKEND_URL))?;

        cfg.enrolment_url = get(ENV_ENROLMENT_URL);
        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().with_context(|| format!("invalid {}: '{}'", ENV_REQUEST_TIMEOUT_SECS, raw))?;
            if secs == 0 {
                return Err(anyhow!("{} must be greater than zero", ENV_REQUEST_TIMEOUT_SECS));
            }
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(ENV_WALLET_MODE) {
            cfg.wallet_mode = raw.parse().map_err(|e: String| anyhow!("invalid {}: {}", ENV_WALLET_MODE, e))?;
        }
        Ok(cfg)
    }

    /// Enrolment deep link carrying `returnUrl` so the enrolment flow can send the
    /// user back. `None` when no enrolment URL is configured.
    pub fn enrolment_link(&self, return_url: &str) -> Option<String> {
        let base = self.enrolment_url.as_deref()?;
        let sep = if base.contains('?') { '&' } else { '?' };
        Some(format!("{}{}returnUrl={}", base, sep, urlencoding::encode(return_url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| m.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[(ENV_BACKEND_URL, "https://iam.example.org/api")])).unwrap();
        assert_eq!(cfg.backend_url.as_str(), "https://iam.example.org/api/");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.wallet_mode, WalletMode::Relay);
        assert!(cfg.enrolment_url.is_none());
        assert!(cfg.enrolment_link("https://app.example.org/").is_none());
    }

    #[test]
    fn backend_url_required() {
        let err = Config::from_lookup(lookup(&[(ENV_BACKEND_URL, "  ")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BACKEND_URL));
    }

    #[test]
    fn overrides_parse() {
        let cfg = Config::from_lookup(lookup(&[
            (ENV_BACKEND_URL, "http://127.0.0.1:3333"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_WALLET_MODE, "metamask"),
        ]))
        .unwrap();
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.wallet_mode, WalletMode::Extension);
    }

    #[test]
    fn bad_values_rejected() {
        assert!(Config::from_lookup(lookup(&[(ENV_BACKEND_URL, "http://h"), (ENV_REQUEST_TIMEOUT_SECS, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_BACKEND_URL, "http://h"), (ENV_REQUEST_TIMEOUT_SECS, "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_BACKEND_URL, "http://h"), (ENV_WALLET_MODE, "ledger")])).is_err());
    }

    #[test]
    fn enrolment_link_appends_return_url() {
        let mut cfg = Config::new("http://h").unwrap();
        cfg.enrolment_url = Some("https://switchboard.example.org/#/enrol?app=demo".into());
        assert_eq!(
            cfg.enrolment_link("https://app.example.org/a b").unwrap(),
            "https://switchboard.example.org/#/enrol?app=demo&returnUrl=https%3A%2F%2Fapp.example.org%2Fa%20b"
        );
        cfg.enrolment_url = Some("https://enrol.example.org/start".into());
        assert_eq!(
            cfg.enrolment_link("x").unwrap(),
            "https://enrol.example.org/start?returnUrl=x"
        );
    }
}
