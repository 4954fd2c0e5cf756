//! In-process stand-in for the matching backend, used by the HTTP tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;

/// One request as the backend saw it.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub file_names: Vec<String>,
    pub job_input: Option<Value>,
    pub json_body: Option<Value>,
}

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    body: String,
    delay: Duration,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    routes: Arc<Mutex<HashMap<(String, String), Canned>>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond_after(method, path, Duration::ZERO, status, body);
    }

    pub fn respond_after(&self, method: &str, path: &str, delay: Duration, status: u16, body: Value) {
        self.install(method, path, delay, status, body.to_string());
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.install(method, path, Duration::ZERO, status, body.to_string());
    }

    fn install(&self, method: &str, path: &str, delay: Duration, status: u16, body: String) {
        self.state.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Canned {
                status,
                body,
                delay,
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle(State(state): State<MockState>, request: Request) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let headers = request.headers().clone();
    let content_type = header_value(&headers, header::CONTENT_TYPE).unwrap_or_default();

    let mut recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        request_id: header_value(&headers, "x-request-id"),
        ..Recorded::default()
    };

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.unwrap();
            match name.as_str() {
                "files" => recorded.file_names.extend(file_name),
                "job_input" => recorded.job_input = serde_json::from_slice(&data).ok(),
                _ => {}
            }
        }
    } else {
        let body = Bytes::from_request(request, &()).await.unwrap();
        recorded.json_body = serde_json::from_slice(&body).ok();
    }

    state.requests.lock().unwrap().push(recorded);

    let canned = state.routes.lock().unwrap().get(&(method, path)).cloned();
    match canned {
        Some(canned) => {
            if !canned.delay.is_zero() {
                tokio::time::sleep(canned.delay).await;
            }
            let status = StatusCode::from_u16(canned.status).unwrap();
            (status, [(header::CONTENT_TYPE, "application/json")], canned.body).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"detail":"Not Found"}"#,
        )
            .into_response(),
    }
}
