//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use serde_json::Value;

use llm_connector::{AppConfig, AppState, Provider, ProviderError, ProviderKind, TemplateStore, router};

const BODY_LIMIT: usize = 1_048_576;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a templates fixture.
pub fn templates_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("templates").join(name)
}

/// Get the path to a provider response fixture.
pub fn response_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("responses").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// What a [`StubProvider`] answers with.
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    ApiError { status: u16, message: String },
}

/// In-process provider that records how it was called.
#[derive(Debug)]
pub struct StubProvider {
    kind: ProviderKind,
    reply: StubReply,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<Option<(String, String, String)>>,
}

impl StubProvider {
    pub fn replying(kind: ProviderKind, text: &str) -> Arc<Self> {
        Arc::new(Self::with_reply(kind, StubReply::Text(text.to_string())))
    }

    pub fn failing(kind: ProviderKind, status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self::with_reply(
            kind,
            StubReply::ApiError {
                status,
                message: message.to_string(),
            },
        ))
    }

    fn with_reply(kind: ProviderKind, reply: StubReply) -> Self {
        Self {
            kind,
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(api_key, system_prompt, prompt)` of the most recent call.
    pub fn last_call(&self) -> Option<(String, String, String)> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(
        &self,
        api_key: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some((
            api_key.to_string(),
            system_prompt.to_string(),
            prompt.to_string(),
        ));
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::ApiError { status, message } => Err(ProviderError::Api {
                provider: self.kind.as_str(),
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Router wired to the given stubs and the bundled templates.
pub fn test_app(openai: Arc<StubProvider>, gemini: Arc<StubProvider>) -> Router {
    test_app_with(AppConfig::testing(), TemplateStore::load(None), openai, gemini)
}

pub fn test_app_with(
    config: AppConfig,
    templates: TemplateStore,
    openai: Arc<StubProvider>,
    gemini: Arc<StubProvider>,
) -> Router {
    let state = AppState::with_providers(&config, templates, openai, gemini)
        .expect("Failed to build app state");
    router(state)
}

pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).expect("Body is not JSON")
}
