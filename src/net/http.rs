//! HTTP client wrapper: base endpoint, default headers, middleware pipeline.
//!
//! DESIGN
//! ======
//! `ApiClient::send` runs every request through an ordered list of request
//! middleware, hands it to a `Transport`, then runs the response through the
//! response middleware before mapping the status to a `ClientError`. Global
//! policies (bearer attachment, 401 handling) live in middleware, so the
//! gateways stay thin and every caller still receives its own error.
//!
//! The `Transport` trait is the seam for tests; `ReqwestTransport` is the
//! production implementation.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::middleware::{RequestMiddleware, ResponseMiddleware};
use crate::config::{Timeouts, normalize_base_url};
use crate::error::ClientError;

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A request after URL resolution, as seen by middleware and transports.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base endpoint, e.g. `/messages`.
    pub path: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends a fully prepared request. Non-2xx statuses are responses, not errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] or [`ClientError::Timeout`] when no
    /// response was received.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the reqwest client cannot be built.
    pub fn new(timeouts: Timeouts) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// API CLIENT
// =============================================================================

/// Configured request sender shared by the gateways. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            base_url: normalize_base_url(base_url),
            default_headers,
            transport,
            request_middleware: Vec::new(),
            response_middleware: Vec::new(),
        }
    }

    /// Append a request middleware. Middleware runs in insertion order.
    #[must_use]
    pub fn with_request_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.request_middleware.push(middleware);
        self
    }

    /// Append a response middleware. Middleware runs in insertion order.
    #[must_use]
    pub fn with_response_middleware(mut self, middleware: Arc<dyn ResponseMiddleware>) -> Self {
        self.response_middleware.push(middleware);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request through the pipeline.
    ///
    /// # Errors
    ///
    /// Transport failures pass through unchanged; non-2xx responses map to
    /// [`ClientError::Auth`] or [`ClientError::Server`] after the response
    /// middleware has run.
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse, ClientError> {
        let mut request = ApiRequest {
            method,
            path: path.to_owned(),
            url: self.url(path),
            headers: self.default_headers.clone(),
            body,
        };
        for middleware in &self.request_middleware {
            middleware.on_request(&mut request);
        }

        debug!(method = %request.method, path = %request.path, "api request");
        let response = match self.transport.execute(&request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(method = %request.method, path = %request.path, error = %e, "api request failed");
                return Err(e);
            }
        };
        debug!(method = %request.method, path = %request.path, status = response.status, "api response");

        for middleware in &self.response_middleware {
            middleware.on_response(&request, &response);
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::from_status(response.status, response.body))
        }
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ClientError::Decode`] for bad bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None).await?.json()
    }

    /// `GET` a resource as raw text.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        Ok(self.send(Method::GET, path, None).await?.body)
    }

    /// `POST` a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ClientError::Encode`] / [`ClientError::Decode`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.send(Method::POST, path, Some(body)).await?.json()
    }

    /// `POST` without a body, ignoring the response payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        self.send(Method::POST, path, None).await?;
        Ok(())
    }
}
