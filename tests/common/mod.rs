use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::post, Router};
use recap::{app, build_state, AppConfig};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Tracks environment variable mutations and restores originals on drop.
#[allow(dead_code)]
pub struct EnvGuard {
    originals: HashMap<String, Option<String>>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new() -> Self {
        Self {
            originals: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.capture(key);
        std::env::set_var(key, value);
    }

    pub fn set_many(&mut self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.capture(key);
        std::env::remove_var(key);
    }

    fn capture(&mut self, key: &str) {
        if self.originals.contains_key(key) {
            return;
        }
        let original = std::env::var(key).ok();
        self.originals.insert(key.to_string(), original);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.originals.drain() {
            match original {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// A request seen by the mock completion API.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Captured {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockUpstream {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

/// Serve a canned completion response on an ephemeral port.  Returns the
/// chat-completions URL and the log of requests it received.
#[allow(dead_code)]
pub async fn spawn_upstream(
    status: u16,
    body: &str,
) -> (String, Arc<Mutex<Vec<Captured>>>, JoinHandle<()>) {
    async fn respond(
        State(mock): State<MockUpstream>,
        headers: HeaderMap,
        raw: String,
    ) -> axum::response::Response {
        let body = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        mock.seen.lock().await.push(Captured {
            authorization,
            body,
        });
        (mock.status, mock.body.clone()).into_response()
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = MockUpstream {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        seen: seen.clone(),
    };
    let router = Router::new()
        .route("/openai/v1/chat/completions", post(respond))
        .with_state(mock);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (
        format!("http://{}/openai/v1/chat/completions", addr),
        seen,
        handle,
    )
}

/// Start the relay against `api_url` and return its base URL.
#[allow(dead_code)]
pub async fn spawn_app(api_url: &str) -> (String, JoinHandle<()>) {
    let config = AppConfig {
        api_key: "gsk_test".into(),
        api_url: api_url.to_string(),
        ..AppConfig::default()
    };
    spawn_app_with(config).await
}

#[allow(dead_code)]
pub async fn spawn_app_with(config: AppConfig) -> (String, JoinHandle<()>) {
    let state = build_state(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}
