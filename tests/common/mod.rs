//! In-process mock of the backend authorization service, served by axum on an
//! ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub struct MockBackend {
    pub token: String,
    pub roles: Mutex<Value>,
    pub login_status: AtomicU16,
    pub roles_status: AtomicU16,
    pub login_delay_ms: AtomicU64,
    pub login_calls: AtomicUsize,
    pub roles_calls: AtomicUsize,
    pub claims: Mutex<Vec<Value>>,
    pub bearers: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(token: &str, roles: Value) -> Arc<Self> {
        Arc::new(Self {
            token: token.to_string(),
            roles: Mutex::new(roles),
            login_status: AtomicU16::new(200),
            roles_status: AtomicU16::new(200),
            login_delay_ms: AtomicU64::new(0),
            login_calls: AtomicUsize::new(0),
            roles_calls: AtomicUsize::new(0),
            claims: Mutex::new(Vec::new()),
            bearers: Mutex::new(Vec::new()),
        })
    }

    pub fn installer(token: &str) -> Arc<Self> {
        Self::new(token, json!([{"name": "Installer", "namespace": "installer.roles.energyweb.iam"}]))
    }

    pub fn set_login_status(&self, s: u16) { self.login_status.store(s, Ordering::SeqCst); }
    pub fn set_roles_status(&self, s: u16) { self.roles_status.store(s, Ordering::SeqCst); }
    pub fn set_login_delay(&self, d: Duration) { self.login_delay_ms.store(d.as_millis() as u64, Ordering::SeqCst); }
    pub fn login_calls(&self) -> usize { self.login_calls.load(Ordering::SeqCst) }
    pub fn roles_calls(&self) -> usize { self.roles_calls.load(Ordering::SeqCst) }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn login(State(b): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Response {
    b.login_calls.fetch_add(1, Ordering::SeqCst);
    b.claims.lock().push(body.get("claim").cloned().unwrap_or(Value::Null));
    let delay = b.login_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let code = status(b.login_status.load(Ordering::SeqCst));
    if code != StatusCode::OK {
        return (code, Json(json!({"error": "invalid claim"}))).into_response();
    }
    Json(json!({"token": b.token})).into_response()
}

async fn roles(State(b): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    b.roles_calls.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    b.bearers.lock().push(bearer.clone());
    if bearer != format!("Bearer {}", b.token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let code = status(b.roles_status.load(Ordering::SeqCst));
    if code != StatusCode::OK {
        return code.into_response();
    }
    let body = b.roles.lock().clone();
    Json(body).into_response()
}

/// Serve the mock under `/api` and return the backend base URL.
pub async fn spawn_backend(b: Arc<MockBackend>) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/roles", get(roles))
        .with_state(b);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}/api", addr))
}
