//! Shared fakes and fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::Method;
use tokio::sync::Barrier;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::nav::{MemoryNavigator, Route};
use crate::net::http::{ApiRequest, ApiResponse, Transport};
use crate::net::types::{Message, User};
use crate::services::health::{HealthCheck, ServerStatus, StatusObserver};
use crate::state::AppState;
use crate::storage::{MemoryStore, TokenStore};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, ClientError> + Send + Sync>;

// =============================================================================
// FAKE TRANSPORT
// =============================================================================

/// Transport answering from a closure and recording every request.
pub struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
    barrier: Option<Barrier>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, ClientError> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()), barrier: None })
    }

    /// Hold every request until `parties` requests are in flight together.
    pub fn with_barrier<F>(parties: usize, handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, ClientError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            barrier: Some(Barrier::new(parties)),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        (self.handler)(request)
    }
}

pub fn json_response(status: u16, value: &serde_json::Value) -> Result<ApiResponse, ClientError> {
    Ok(ApiResponse::new(status, value.to_string()))
}

pub fn status_response(status: u16) -> Result<ApiResponse, ClientError> {
    Ok(ApiResponse::new(status, ""))
}

// =============================================================================
// APP WIRING
// =============================================================================

pub struct TestApp {
    pub app: AppState,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<MemoryNavigator>,
}

impl TestApp {
    pub fn tokens(&self) -> &TokenStore {
        &self.app.tokens
    }
}

/// Full component graph over a fake transport, starting at `Route::Messages`.
pub fn test_app(transport: Arc<FakeTransport>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(MemoryNavigator::new(Route::Messages));
    let app = AppState::new(ClientConfig::default(), store.clone(), navigator.clone(), transport);
    TestApp { app, store, navigator }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn dummy_user() -> User {
    User { id: 1, username: "alice".into(), role: "USER".into(), created_at: "2024-01-01T00:00:00".into() }
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({"id": 1, "username": "alice", "role": "USER", "createdAt": "2024-01-01T00:00:00"})
}

pub fn auth_json(token: &str) -> serde_json::Value {
    serde_json::json!({
        "accessToken": token,
        "tokenType": "Bearer",
        "expiresIn": 86_400_000,
        "username": "alice",
        "role": "USER"
    })
}

pub fn dummy_message(id: i64, content: &str) -> Message {
    Message { id, content: content.into(), timestamp: "2024-01-01T00:00:00Z".into(), author: None }
}

pub fn message_json(id: i64, content: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "content": content, "timestamp": "2024-01-01T00:00:00Z"})
}

// =============================================================================
// HEALTH FAKES
// =============================================================================

/// Health check answering from a script; healthy once the script runs out.
pub struct ScriptedHealth {
    script: Mutex<VecDeque<bool>>,
    calls: AtomicUsize,
}

impl ScriptedHealth {
    pub fn new(script: &[bool]) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.iter().copied().collect()), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HealthCheck for ScriptedHealth {
    async fn check(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let healthy = self.script.lock().unwrap().pop_front().unwrap_or(true);
        if healthy { Ok(()) } else { Err(ClientError::Network("connection refused".into())) }
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<(ServerStatus, ServerStatus)>>,
}

impl RecordingObserver {
    pub fn transitions(&self) -> Vec<(ServerStatus, ServerStatus)> {
        self.transitions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StatusObserver for RecordingObserver {
    async fn on_status_change(&self, from: ServerStatus, to: ServerStatus) {
        self.transitions.lock().unwrap().push((from, to));
    }
}

/// The bearer token a request carries, if any.
pub fn bearer(request: &ApiRequest) -> Option<String> {
    request
        .headers
        .get(reqwest::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}
