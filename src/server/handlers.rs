use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::{RelayError, ValidationError};
use crate::llm::Provider;
use crate::relay::{GenerationRequest, ResponseFormat};
use crate::version::ServiceInfo;

use super::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
pub(super) struct FormatQuery {
    format: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub(super) async fn call_openai(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, RelayError> {
    relay_to(&state, state.openai.as_ref(), &query, &headers, payload).await
}

pub(super) async fn call_gemini(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, RelayError> {
    relay_to(&state, state.gemini.as_ref(), &query, &headers, payload).await
}

async fn relay_to(
    state: &AppState,
    provider: &dyn Provider,
    query: &FormatQuery,
    headers: &HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, RelayError> {
    let Json(request) = payload.map_err(|e| ValidationError::MalformedBody(e.body_text()))?;
    let format = negotiate_format(query.format.as_deref(), request.format, headers);

    let text = state.relay.generate(provider, &request).await?;

    Ok(match format {
        ResponseFormat::Json => Json(json!({ "message": text })).into_response(),
        ResponseFormat::Text => text.into_response(),
    })
}

/// Query parameter wins, then the body field, then the `Accept` header.
fn negotiate_format(
    query: Option<&str>,
    body: Option<ResponseFormat>,
    headers: &HeaderMap,
) -> ResponseFormat {
    if let Some(format) = query {
        return if format.eq_ignore_ascii_case("text") {
            ResponseFormat::Text
        } else {
            ResponseFormat::Json
        };
    }
    if let Some(format) = body {
        return format;
    }

    let wants_text = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.split(',').any(accepts_plain_text));
    if wants_text {
        ResponseFormat::Text
    } else {
        ResponseFormat::Json
    }
}

/// `text/plain` media range with a non-zero quality.
fn accepts_plain_text(media_range: &str) -> bool {
    let mut parts = media_range.split(';').map(str::trim);
    if !parts
        .next()
        .is_some_and(|media| media.eq_ignore_ascii_case("text/plain"))
    {
        return false;
    }

    // A missing or unparseable q counts as 1.
    parts
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .and_then(|(_, value)| value.trim().parse::<f32>().ok())
        .is_none_or(|q| q > 0.0)
}

pub(super) async fn echo() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

pub(super) async fn version() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

pub(super) async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
