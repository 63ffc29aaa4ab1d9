use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::path::PathBuf;

use crate::cors::cors_headers;

/// Errors the relay reports back to the browser
#[derive(Debug)]
pub enum ProxyError {
    /// Request body is not a relay envelope
    InvalidJson,
    /// Destination host is not on the allowlist
    HostNotAllowed(String),
    /// A requested header cannot be sent over HTTP
    InvalidHeader(String),
    /// Upstream did not answer within the relay timeout
    UpstreamTimeout,
    /// Upstream could not be reached (DNS, refused connection, TLS, broken body)
    UpstreamUnreachable(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "Invalid JSON"),
            Self::HostNotAllowed(host) => write!(f, "Host not allowed: {}", host),
            Self::InvalidHeader(name) => write!(f, "Invalid header: {}", name),
            Self::UpstreamTimeout => write!(f, "Upstream request timed out"),
            Self::UpstreamUnreachable(msg) => write!(f, "Upstream request failed: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::HostNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::InvalidHeader(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Malformed envelopes are answered bare; everything after parsing carries CORS headers.
    fn with_cors(&self) -> bool {
        !matches!(self, Self::InvalidJson)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        if self.with_cors() {
            (status, cors_headers(), body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::UpstreamTimeout
        } else {
            Self::UpstreamUnreachable(err.to_string())
        }
    }
}

/// Errors raised by the data refresh helper
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to read dataset {path}: {source}")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} is not valid JSON: {source}")]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset {path} has unexpected shape: {reason}")]
    DatasetShape { path: PathBuf, reason: String },

    #[error("failed to write dataset {path}: {source}")]
    DatasetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
