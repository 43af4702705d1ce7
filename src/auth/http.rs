use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::{AuthError, AuthResult};
use crate::identity::IdentityProof;
use super::client::AuthClient;
use super::model::{LoginBody, LoginReply, Role, SessionToken};

/// Parse the backend base URL so that endpoint names are appended to its path
/// (`https://host/api` -> `https://host/api/login`).
pub(crate) fn http_base(base: &str) -> Result<Url> {
    let mut url = Url::parse(base.trim()).context("invalid backend URL")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("backend URL must be http or https, got '{}'", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err(anyhow!("backend URL cannot be used as a base: {}", base));
    }
    if !url.path().ends_with('/') {
        let p = format!("{}/", url.path());
        url.set_path(&p);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// reqwest-backed client for `POST /login` and `GET /roles`.
#[derive(Clone)]
pub struct HttpAuthClient {
    base: Url,
    login_url: Url,
    roles_url: Url,
    client: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let base = http_base(base)?;
        let login_url = base.join("login")?;
        let roles_url = base.join("roles")?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base, login_url, roles_url, client })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.backend_url.as_str(), cfg.request_timeout)
    }

    pub fn base(&self) -> &Url { &self.base }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, proof: IdentityProof) -> AuthResult<SessionToken> {
        let resp = self.client
            .post(self.login_url.clone())
            .json(&LoginBody { claim: &proof })
            .send()
            .await?;
        let status = resp.status();
        debug!(target: "rolegate", url = %self.login_url, status = status.as_u16(), "auth.login response");
        if status.is_client_error() {
            return Err(AuthError::AuthRejected { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(AuthError::network(format!("login returned HTTP {}", status)));
        }
        let reply: LoginReply = resp.json().await?;
        SessionToken::parse(reply.token).ok_or_else(|| AuthError::network("login response carried an empty token"))
    }

    async fn fetch_roles(&self, token: &SessionToken) -> AuthResult<Vec<Role>> {
        let resp = self.client
            .get(self.roles_url.clone())
            .bearer_auth(token.as_str())
            .send()
            .await?;
        let status = resp.status();
        debug!(target: "rolegate", url = %self.roles_url, status = status.as_u16(), "auth.roles response");
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::network(format!("roles returned HTTP {}", status)));
        }
        let roles: Vec<Role> = resp.json().await?;
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keeps_path_prefix() {
        let c = HttpAuthClient::new("https://iam.example.org/api", Duration::from_secs(5)).unwrap();
        assert_eq!(c.login_url.as_str(), "https://iam.example.org/api/login");
        assert_eq!(c.roles_url.as_str(), "https://iam.example.org/api/roles");
    }

    #[test]
    fn base_without_path() {
        let c = HttpAuthClient::new("http://127.0.0.1:3333/", Duration::from_secs(5)).unwrap();
        assert_eq!(c.login_url.as_str(), "http://127.0.0.1:3333/login");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(http_base("ftp://example.org").is_err());
        assert!(http_base("not a url").is_err());
    }
}
