pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use http::{HttpOptions, HttpTransport};
pub use memory::MemoryTransport;

pub const BORROWINGS_PATH: &str = "/api/borrowings";
pub const INVENTORY_PATH: &str = "/api/inventory";
pub const AREAS_PATH: &str = "/api/areas";
pub const LOGOUT_PATH: &str = "/logout";

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {path} failed: {message}")]
    Network { path: String, message: String },

    #[error("server rejected request with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid header '{header}', expected 'Key: Value'")]
    InvalidHeader { header: String },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl RemoteError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError>;
}

pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, RemoteError> {
        let response = self.exchange(ApiRequest::get(path)).await?;
        decode(path, &response.body)
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        self.send_json(reqwest::Method::PUT, path, body).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, RemoteError> {
        let response = self.exchange(ApiRequest::delete(path)).await?;
        decode(path, &response.body)
    }

    async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        let body = serde_json::to_value(body).map_err(|source| RemoteError::Encode {
            path: path.to_string(),
            source,
        })?;
        let response = self
            .exchange(ApiRequest {
                method,
                path: path.to_string(),
                body: Some(body),
            })
            .await?;
        decode(path, &response.body)
    }

    /// Sends the request and turns a non-2xx status into `Rejected`.
    pub async fn exchange(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        let response = self.transport.send(request).await?;
        if response.is_ok() {
            Ok(response)
        } else {
            Err(RemoteError::Rejected {
                status: response.status,
                message: extract_error_message(&response.body),
            })
        }
    }
}

fn decode<R: DeserializeOwned>(path: &str, body: &str) -> Result<R, RemoteError> {
    let text = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(text).map_err(|source| RemoteError::Decode {
        path: path.to_string(),
        source,
    })
}

pub fn record_path(base: &str, id: u64) -> String {
    format!("{base}/{id}")
}
