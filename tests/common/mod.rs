//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use portal_gateway::config::RegistryConfig;
use portal_gateway::gateway::GatewayService;
use portal_gateway::http::{build_router, AppState};
use portal_gateway::registry::InMemoryRegistry;

pub const SERVICE_KEY: &str = "test-service-role";

/// Fixed "today" so metric rows never straddle midnight.
pub fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Router over an in-memory registry, plus a handle to inspect its tables.
pub fn test_app() -> (Router, Arc<InMemoryRegistry>) {
    let registry = Arc::new(InMemoryRegistry::new());
    let service = GatewayService::with_clock(registry.clone(), fixed_day);
    let router = build_router(AppState::new(service), std::time::Duration::from_secs(5));
    (router, registry)
}

/// A request as seen by the mock registry.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub table: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<HashMap<String, (u16, String)>>,
}

/// Mock PostgREST endpoint serving `/rest/v1/{table}`.
pub struct MockRegistry {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockRegistry {
    /// Start a mock on an ephemeral port.
    ///
    /// `responses` is keyed by `"{METHOD} {table}"`. Unlisted GETs return
    /// `[]`, unlisted POSTs 201 and unlisted PATCHes 204.
    pub async fn start(responses: Vec<(&str, u16, String)>) -> Self {
        let responses: HashMap<String, (u16, String)> = responses
            .into_iter()
            .map(|(key, status, body)| (key.to_string(), (status, body)))
            .collect();
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(responses),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/rest/v1/{table}", any(mock_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> RegistryConfig {
        RegistryConfig {
            url: format!("http://{}", self.addr),
            service_key: SERVICE_KEY.to_string(),
            timeout_secs: 5,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, table: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.table == table)
            .collect()
    }
}

async fn mock_handler(
    State(state): State<MockState>,
    Path(table): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        table: table.clone(),
        query: query.unwrap_or_default(),
        headers,
        body,
    });

    let key = format!("{} {}", method, table);
    match state.responses.get(&key) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            [("content-type", "application/json")],
            body.clone(),
        )
            .into_response(),
        None if method == Method::GET => (
            StatusCode::OK,
            [("content-type", "application/json")],
            "[]".to_string(),
        )
            .into_response(),
        None if method == Method::POST => StatusCode::CREATED.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
