//! Loopback KSM stub for client and coordinator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use tokio::net::TcpListener;
use url::Url;

use crate::config::KsmConfig;

/// Headers and body captured from one key request.
pub(crate) struct SeenRequest {
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

struct StubState {
    status: StatusCode,
    response_body: String,
    hits: AtomicUsize,
    last_request: Mutex<Option<SeenRequest>>,
}

/// In-process KSM standing in for the real key server.
pub(crate) struct KsmStub {
    base_url: Url,
    state: Arc<StubState>,
}

impl KsmStub {
    /// Spawn a stub that answers every POST with `response_body`.
    pub async fn spawn(response_body: &str) -> Self {
        Self::spawn_with_status(StatusCode::OK, response_body).await
    }

    pub async fn spawn_with_status(status: StatusCode, response_body: &str) -> Self {
        let state = Arc::new(StubState {
            status,
            response_body: response_body.to_owned(),
            hits: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        });

        let router = Router::new()
            .route("/fps/", post(handle_key_request))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub KSM listener");
        let addr = listener.local_addr().expect("read stub KSM local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("run stub KSM");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/fps/")).expect("parse stub KSM URL"),
            state,
        }
    }

    /// Config pointing a `KsmClient` at this stub.
    pub fn config(&self) -> KsmConfig {
        KsmConfig::new(self.base_url.clone(), "test-token")
            .with_request_timeout(Duration::from_secs(5))
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.state
            .last_request
            .lock()
            .expect("stub KSM state poisoned")
            .take()
    }
}

async fn handle_key_request(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let seen = SeenRequest {
        content_type: header_str(header::CONTENT_TYPE),
        authorization: header_str(header::AUTHORIZATION),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    };
    *state
        .last_request
        .lock()
        .expect("stub KSM state poisoned") = Some(seen);

    (state.status, state.response_body.clone())
}
