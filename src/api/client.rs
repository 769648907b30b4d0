//! HTTP client wrapper for the upstream REST API
//!
//! Builds URLs and headers, attaches the bearer token, races every exchange
//! against a timeout and normalizes JSON/text bodies. A 401 from upstream is
//! reported as [`ApiError::Unauthorized`] so callers can end the session.

use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors produced by upstream calls
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{message} (HTTP {status})")]
    Status { status: StatusCode, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// True when the session token is missing or was rejected upstream
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout(_) => "Server tidak merespons, coba lagi nanti".to_string(),
            ApiError::Network(_) => "Gagal terhubung ke server".to_string(),
            ApiError::Unauthorized(_) => "Sesi berakhir, silakan login kembali".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => "Respons server tidak dikenali".to_string(),
            ApiError::InvalidUrl(_) => "Alamat API tidak valid".to_string(),
        }
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Attach `Authorization: Bearer <token>`
    pub require_auth: bool,
    pub token: Option<String>,
    pub headers: HeaderMap,
    pub params: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for endpoints that take no token
    pub fn public() -> Self {
        Self::default()
    }

    /// Options for endpoints behind the session token
    pub fn authed(token: impl Into<String>) -> Self {
        Self {
            require_auth: true,
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Normalized upstream response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Parsed JSON, the raw text for non-JSON bodies, or null when empty
    pub data: Value,
    pub status: StatusCode,
    pub ok: bool,
}

impl ApiResponse {
    /// Deserialize the body into a typed value
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.data)?)
    }
}

/// Client for the upstream REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("indibiz-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn get(&self, path: &str, opts: &RequestOptions) -> Result<ApiResponse, ApiError> {
        self.request(Method::GET, path, None, opts).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, Some(body), opts).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: &Value,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PUT, path, Some(body), opts).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: &Value,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PATCH, path, Some(body), opts).await
    }

    pub async fn delete(&self, path: &str, opts: &RequestOptions) -> Result<ApiResponse, ApiError> {
        self.request(Method::DELETE, path, None, opts).await
    }

    /// Perform one request against the upstream API
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(path, &opts.params)?;

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(opts.headers.clone())
            .header(ACCEPT, "application/json");

        if opts.require_auth {
            let token = opts
                .token
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ApiError::Unauthorized("No session token".to_string()))?;
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let started = Instant::now();

        // Dropping the exchange on timeout also drops the in-flight request
        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("json"));
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, is_json, text))
        };

        let (status, is_json, text) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => {
                warn!("{} {} failed: {}", method, url, e);
                return Err(ApiError::Network(e));
            }
            Err(_) => {
                warn!("{} {} timed out after {:?}", method, url, self.timeout);
                return Err(ApiError::Timeout(self.timeout));
            }
        };

        debug!(
            "{} {} -> {} in {}ms",
            method,
            url,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        let data = normalize_body(is_json, text);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(
                extract_message(&data).unwrap_or_else(|| "Unauthorized".to_string()),
            ));
        }

        if !status.is_success() {
            let message = extract_message(&data)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            warn!("{} {} rejected: {} ({})", method, url, message, status);
            return Err(ApiError::Status { status, message });
        }

        Ok(ApiResponse {
            data,
            status,
            ok: status.is_success(),
        })
    }

    /// Join the base URL with a resource path and query parameters
    fn url(&self, path: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)?;

        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }
}

fn normalize_body(is_json: bool, text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    if is_json {
        if let Ok(value) = serde_json::from_str(&text) {
            return value;
        }
    }
    Value::String(text)
}

fn extract_message(data: &Value) -> Option<String> {
    data.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
