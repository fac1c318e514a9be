// Copyright 2023 rust-dns-sdk authors
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! HTTP transport seam.
//!
//! The pipeline only ever talks to an [`AsyncTransport`] or a
//! [`BlockingTransport`]. The reqwest-backed implementations here are what the
//! clients use by default; tests and custom stacks can plug in their own.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{AtlasDnsError, TransportError};

/// Header carrying the static API credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Boxed future used by the scoped async client API.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully resolved request, ready to be put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL without the query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Transport that suspends at the network boundary.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport that blocks the calling thread for the whole exchange.
pub trait BlockingTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

impl<T: BlockingTransport + ?Sized> BlockingTransport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Default async transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a pooled client with the configured timeout, TLS and headers.
    pub fn new(config: &ClientConfig) -> Result<Self, AtlasDnsError> {
        let inner = reqwest::Client::builder()
            .default_headers(build_headers(config)?)
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl())
            .build()
            .map_err(|e| AtlasDnsError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// Wraps an existing client as-is. Headers and timeouts are the caller's responsibility.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self.inner.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Default blocking transport backed by `reqwest::blocking::Client`.
///
/// Must not be constructed from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    inner: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, AtlasDnsError> {
        let inner = reqwest::blocking::Client::builder()
            .default_headers(build_headers(config)?)
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl())
            .build()
            .map_err(|e| AtlasDnsError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    pub fn with_client(inner: reqwest::blocking::Client) -> Self {
        Self { inner }
    }
}

impl BlockingTransport for BlockingReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self.inner.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send()?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap, AtlasDnsError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = config.api_key() {
        let mut value = HeaderValue::from_str(key)
            .map_err(|e| AtlasDnsError::Config(format!("invalid api_key: {e}")))?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_credential_when_configured() {
        let config = ClientConfig::builder().api_key("k-123").build().unwrap();
        let headers = build_headers(&config).unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        let key = headers.get(API_KEY_HEADER).unwrap();
        assert_eq!(key, "k-123");
        assert!(key.is_sensitive());
    }

    #[test]
    fn headers_omit_credential_by_default() {
        let headers = build_headers(&ClientConfig::default()).unwrap();
        assert!(headers.get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn async_transport_builds_from_config() {
        let config = ClientConfig::builder().verify_ssl(false).build().unwrap();
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
