#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use gatehouse::{
    app,
    config::{AccountsConfig, ResetConfig, SheetsConfig},
    db,
    scan::scanner::{PortScanner, ScanFailure},
    sheets::store::UserSheetStore,
    state::{AccountsState, SheetsState},
};

pub const RESET_SECRET: &str = "test-reset-secret";

pub async fn accounts_state() -> AccountsState {
    let pool = db::connect_in_memory().await.expect("memory db");
    db::migrate(&pool).await.expect("migrate");
    let config = Arc::new(AccountsConfig {
        database_url: "sqlite::memory:".into(),
        reset: ResetConfig::with_secret(RESET_SECRET),
        public_base_url: None,
        host: "127.0.0.1".into(),
        port: 0,
    });
    AccountsState::from_parts(pool, config)
}

pub async fn accounts_app() -> (Router, AccountsState) {
    let state = accounts_state().await;
    (app::build_accounts_app(state.clone()), state)
}

#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Output(String),
    Missing,
    Timeout,
}

/// Records every invocation instead of spawning a process.
pub struct FakeScanner {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
    pub outcome: FakeOutcome,
}

impl FakeScanner {
    pub fn new(outcome: FakeOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome,
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortScanner for FakeScanner {
    async fn run(
        &self,
        target: &str,
        flags: &[String],
        timeout: Duration,
    ) -> Result<String, ScanFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((target.to_string(), flags.to_vec()));
        match &self.outcome {
            FakeOutcome::Output(out) => Ok(out.clone()),
            FakeOutcome::Missing => Err(ScanFailure::ToolMissing("nmap".into())),
            FakeOutcome::Timeout => Err(ScanFailure::TimedOut(timeout)),
        }
    }
}

pub struct SheetsHarness {
    pub app: Router,
    pub scanner: Arc<FakeScanner>,
    pub store: Arc<UserSheetStore>,
    pub dir: TempDir,
}

pub fn sheets_harness(api_key: Option<&str>, outcome: FakeOutcome) -> SheetsHarness {
    let dir = tempfile::tempdir().expect("tempdir");
    let sheet_path = dir.path().join("user.xlsx");
    let config = Arc::new(SheetsConfig {
        api_key: api_key.map(str::to_string),
        sheet_path: sheet_path.display().to_string(),
        nmap_path: "nmap".into(),
        scan_timeout_secs: 180,
        host: "127.0.0.1".into(),
        port: 0,
    });
    let store = Arc::new(UserSheetStore::new(&sheet_path));
    let scanner = FakeScanner::new(outcome);
    let state = SheetsState::from_parts(store.clone(), scanner.clone(), config);
    SheetsHarness {
        app: app::build_sheets_app(state),
        scanner,
        store,
        dir,
    }
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post_with_key(uri: &str, key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", key)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with an arbitrary body and no `Content-Type` header.
pub fn bare_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send_text(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let res = app.clone().oneshot(req).await.expect("request handled");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, text) = send_text(app, req).await;
    let value = serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("expected JSON body, got {text:?}: {e}"));
    (status, value)
}
