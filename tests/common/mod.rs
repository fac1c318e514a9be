#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atlas_dns_sdk::ClientConfig;
use atlas_dns_sdk::error::TransportError;
use atlas_dns_sdk::transport::{AsyncTransport, BlockingTransport, HttpRequest, HttpResponse};

pub type Step = Result<HttpResponse, TransportError>;

/// Transport that replays a fixed script and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::default(),
        })
    }

    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        Self::new([Ok(HttpResponse::new(status, body))])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn next(&self, request: &HttpRequest) -> Step {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("script exhausted".into())))
    }
}

impl BlockingTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.next(request)
    }
}

#[async_trait]
impl AsyncTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.next(request)
    }
}

/// Transport whose requests never complete.
pub struct HangingTransport;

#[async_trait]
impl AsyncTransport for HangingTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        std::future::pending().await
    }
}

pub fn connect_failure() -> Step {
    Err(TransportError::Connect("connection refused".into()))
}

pub fn test_config() -> ClientConfig {
    ClientConfig::builder()
        .base_url("http://dns.test:5380")
        .api_key("test-key")
        .retry_backoff(Duration::from_millis(1))
        .build()
        .unwrap()
}

/// Every status the pipeline turns into an error.
pub const FAILING_STATUSES: [u16; 9] = [401, 403, 404, 422, 429, 500, 502, 503, 418];
