use crate::{allowlist::HostAllowlist, cors::apply_cors, error::ProxyError};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        header::{ACCEPT_ENCODING, CONTENT_TYPE},
        HeaderMap, HeaderName, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub allowlist: Arc<HostAllowlist>,
    /// Outbound client, built with the relay timeout
    pub http_client: reqwest::Client,
}

/// JSON envelope posted by the playground page
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Either a pre-encoded string or any JSON value to be serialised
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

impl RelayRequest {
    pub fn parse(raw: &[u8]) -> Result<Self, ProxyError> {
        serde_json::from_slice(raw).map_err(|_| ProxyError::InvalidJson)
    }

    /// Bytes to send upstream
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            None => Vec::new(),
            Some(serde_json::Value::String(s)) => s.clone().into_bytes(),
            Some(value) => value.to_string().into_bytes(),
        }
    }

    /// Caller headers plus `Accept-Encoding: identity` so the body relays byte-for-byte
    pub fn upstream_headers(&self) -> Result<HeaderMap, ProxyError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ProxyError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ProxyError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        Ok(headers)
    }
}

/// Handle POST /proxy
///
/// Upstream error statuses are relayed as-is; only transport failures
/// become proxy-level errors.
pub async fn handle_relay(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let request = RelayRequest::parse(&body)?;

    let host = state.allowlist.check(&request.url).map_err(|host| {
        tracing::warn!(host = %host, "Rejected relay to host outside allowlist");
        ProxyError::HostNotAllowed(host)
    })?;

    let headers = request.upstream_headers()?;
    let start = Instant::now();

    let upstream = state
        .http_client
        .post(&request.url)
        .headers(headers)
        .body(request.body_bytes())
        .send()
        .await
        .map_err(|e| {
            tracing::error!(host = %host, error = %e, "Upstream request failed");
            ProxyError::from(e)
        })?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body_bytes = upstream.bytes().await.map_err(|e| {
        tracing::error!(host = %host, error = %e, "Failed to read upstream body");
        ProxyError::from(e)
    })?;

    tracing::info!(
        host = %host,
        status = status.as_u16(),
        bytes = body_bytes.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Relayed request"
    );

    let mut response = (status, Body::from(body_bytes)).into_response();
    let response_headers = response.headers_mut();
    apply_cors(response_headers);

    if status.is_success() {
        if let Some(value) = content_type {
            response_headers.insert(CONTENT_TYPE, value);
        }
    } else {
        response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(response)
}
