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

//! Request pipeline shared by the blocking and async clients.
//!
//! A call goes through three steps:
//!
//! 1. Resolve `path` under [`API_PREFIX`] and attach query params and JSON body.
//! 2. Hand the request to the transport, retrying timeouts and connection
//!    failures with exponential backoff.
//! 3. Map the response status to a typed error, or decode the body as JSON
//!    (falling back to the raw text).
//!
//! Only the second step differs between [`Pipeline::execute`] and
//! [`Pipeline::execute_blocking`].

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::{Method, Url};
use serde_json::Value;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{
    AUTHENTICATION_FAILED, AtlasDnsError, PERMISSION_DENIED, RATE_LIMIT_EXCEEDED, RESOURCE_NOT_FOUND, Result,
    TransportError,
};
use crate::transport::{AsyncTransport, BlockingTransport, HttpRequest, HttpResponse};

/// Versioned prefix every API path is resolved under.
pub const API_PREFIX: &str = "/api/v2";

/// Upper bound for a single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Query string parameters. Order is irrelevant to the server.
pub type QueryParams = BTreeMap<String, String>;

/// Exponential backoff schedule for transient transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries(), config.retry_backoff())
    }

    /// Total attempts including the first one. Never less than one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Waits before each retry: 2x, 4x, 8x... the backoff unit, jittered and capped.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + Send + use<> {
        let unit = u64::try_from(self.backoff.as_millis()).unwrap_or(u64::MAX);
        let retries = (self.max_attempts() - 1) as usize;
        ExponentialBackoff::from_millis(2)
            .factor(unit)
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(retries)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Builds requests, drives retries and maps responses.
#[derive(Debug, Clone)]
pub struct Pipeline {
    base_url: Url,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|e| AtlasDnsError::Config(format!("invalid base_url: {e}")))?;
        Ok(Self {
            base_url,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolves `path` under the API prefix. Any path on the base URL is replaced.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<HttpRequest> {
        if path.starts_with(API_PREFIX) {
            return Err(AtlasDnsError::Config(format!(
                "path must be relative to {API_PREFIX}: {path:?}"
            )));
        }

        let mut url = self.base_url.clone();
        if path.is_empty() || path.starts_with('/') {
            url.set_path(&format!("{API_PREFIX}{path}"));
        } else {
            url.set_path(&format!("{API_PREFIX}/{path}"));
        }
        url.set_query(None);
        url.set_fragment(None);

        let query = params
            .map(|params| params.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        Ok(HttpRequest {
            method,
            url: url.into(),
            query,
            body,
        })
    }

    /// Runs one call on a suspending transport.
    pub async fn execute<T>(
        &self,
        transport: &T,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<Value>
    where
        T: AsyncTransport + ?Sized,
    {
        let request = self.build_request(method, path, params, body)?;
        let request = &request;
        let attempt = AtomicU32::new(0);
        // The condition runs before the schedule is polled, so the failure is
        // parked here until its delay is known.
        let last_error = Mutex::new(None::<TransportError>);

        let schedule = self.retry.delays().inspect(|delay| {
            if let Some(error) = last_error.lock().ok().and_then(|mut slot| slot.take()) {
                self.log_retry(attempt.load(Ordering::Relaxed), *delay, &error);
            }
        });

        let response = RetryIf::start(
            schedule,
            || {
                let n = attempt.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(method = %request.method, url = %request.url, attempt = n, "sending request");
                transport.send(request)
            },
            |error: &TransportError| {
                let retry = self.should_retry(error, attempt.load(Ordering::Relaxed));
                if retry {
                    if let Ok(mut slot) = last_error.lock() {
                        *slot = Some(error.clone());
                    }
                }
                retry
            },
        )
        .await?;

        handle_response(response)
    }

    /// Runs one call on a blocking transport. Backoff waits sleep the calling thread.
    pub fn execute_blocking<T>(
        &self,
        transport: &T,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<Value>
    where
        T: BlockingTransport + ?Sized,
    {
        let request = self.build_request(method, path, params, body)?;
        let mut delays = self.retry.delays();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(method = %request.method, url = %request.url, attempt, "sending request");

            let error = match transport.send(&request) {
                Ok(response) => return handle_response(response),
                Err(error) => error,
            };
            if !self.should_retry(&error, attempt) {
                return Err(error.into());
            }
            match delays.next() {
                Some(delay) => {
                    self.log_retry(attempt, delay, &error);
                    std::thread::sleep(delay);
                }
                None => return Err(error.into()),
            }
        }
    }

    fn should_retry(&self, error: &TransportError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.retry.max_attempts()
    }

    fn log_retry(&self, attempt: u32, delay: Duration, error: &TransportError) {
        warn!(
            attempt,
            max_attempts = self.retry.max_attempts(),
            delay = ?delay,
            error = %error,
            "transport failure, retrying"
        );
    }
}

/// Maps a response to its decoded body or the matching typed error.
///
/// | Status | Result |
/// |---|---|
/// | 401, 403 | [`AtlasDnsError::Authentication`] |
/// | 404 | [`AtlasDnsError::ResourceNotFound`] |
/// | 422 | [`AtlasDnsError::Validation`] with the raw body |
/// | 429 | [`AtlasDnsError::RateLimit`] |
/// | >= 500 | [`AtlasDnsError::Server`] |
/// | other 4xx | [`AtlasDnsError::Api`] with the raw body |
///
/// Anything else is decoded as JSON; a body that is not JSON comes back as
/// [`Value::String`] holding the raw text.
pub fn handle_response(response: HttpResponse) -> Result<Value> {
    let HttpResponse { status, body } = response;
    debug!(status, "received response");

    match status {
        401 => Err(AtlasDnsError::Authentication(AUTHENTICATION_FAILED.into())),
        403 => Err(AtlasDnsError::Authentication(PERMISSION_DENIED.into())),
        404 => Err(AtlasDnsError::ResourceNotFound(RESOURCE_NOT_FOUND.into())),
        422 => Err(AtlasDnsError::Validation { body }),
        429 => Err(AtlasDnsError::RateLimit(RATE_LIMIT_EXCEEDED.into())),
        500.. => Err(AtlasDnsError::Server { status, body }),
        400..=499 => Err(AtlasDnsError::Api { status, body }),
        _ => match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(body)),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pipeline(base_url: &str) -> Pipeline {
        let config = ClientConfig::builder().base_url(base_url).build().unwrap();
        Pipeline::new(&config).unwrap()
    }

    #[test]
    fn path_is_resolved_under_api_prefix() {
        let request = pipeline("http://localhost:5380")
            .build_request(Method::GET, "/zones", None, None)
            .unwrap();
        assert_eq!(request.url, "http://localhost:5380/api/v2/zones");
        assert!(request.query.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn base_path_is_replaced() {
        let request = pipeline("https://dns.example.com/console")
            .build_request(Method::GET, "/zones/z1", None, None)
            .unwrap();
        assert_eq!(request.url, "https://dns.example.com/api/v2/zones/z1");
    }

    #[test]
    fn unsafe_path_characters_are_percent_encoded() {
        let request = pipeline("http://localhost:5380")
            .build_request(Method::GET, "/zones/my zone?x", None, None)
            .unwrap();
        assert_eq!(request.url, "http://localhost:5380/api/v2/zones/my%20zone%3Fx");
    }

    #[test]
    fn prefixed_path_is_rejected() {
        let err = pipeline("http://localhost:5380")
            .build_request(Method::GET, "/api/v2/zones", None, None)
            .unwrap_err();
        assert!(matches!(err, AtlasDnsError::Config(_)));
    }

    #[test]
    fn params_and_body_are_attached() {
        let params = QueryParams::from([("page".to_string(), "2".to_string())]);
        let request = pipeline("http://localhost:5380")
            .build_request(Method::POST, "/zones", Some(&params), Some(json!({"name": "example.com"})))
            .unwrap();
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.body, Some(json!({"name": "example.com"})));
    }

    #[test]
    fn status_table() {
        let cases: [(u16, fn(&AtlasDnsError) -> bool); 8] = [
            (401, |e| matches!(e, AtlasDnsError::Authentication(m) if m == "Authentication failed")),
            (403, |e| matches!(e, AtlasDnsError::Authentication(m) if m == "Permission denied")),
            (404, |e| matches!(e, AtlasDnsError::ResourceNotFound(m) if m == "Resource not found")),
            (422, |e| matches!(e, AtlasDnsError::Validation { body } if body == "payload")),
            (429, |e| matches!(e, AtlasDnsError::RateLimit(m) if m == "Rate limit exceeded")),
            (500, |e| matches!(e, AtlasDnsError::Server { status: 500, .. })),
            (503, |e| matches!(e, AtlasDnsError::Server { status: 503, .. })),
            (409, |e| matches!(e, AtlasDnsError::Api { status: 409, body } if body == "payload")),
        ];

        for (status, expected) in cases {
            let err = handle_response(HttpResponse::new(status, "payload")).unwrap_err();
            assert!(expected(&err), "status {status} mapped to {err:?}");
        }
    }

    #[test]
    fn success_decodes_json() {
        let value = handle_response(HttpResponse::new(200, r#"{"id":"z1","tags":[1,2]}"#)).unwrap();
        assert_eq!(value, json!({"id": "z1", "tags": [1, 2]}));
    }

    #[test]
    fn success_with_text_body_returns_text() {
        let value = handle_response(HttpResponse::new(200, "pong")).unwrap();
        assert_eq!(value, Value::String("pong".into()));

        let value = handle_response(HttpResponse::new(204, "")).unwrap();
        assert_eq!(value, Value::String(String::new()));
    }

    #[test]
    fn retry_schedule_is_bounded_by_attempts() {
        assert_eq!(RetryPolicy::new(3, Duration::from_millis(1)).delays().count(), 2);
        assert_eq!(RetryPolicy::new(1, Duration::from_millis(1)).delays().count(), 0);
        assert_eq!(RetryPolicy::new(0, Duration::from_millis(1)).delays().count(), 0);
    }

    #[test]
    fn retry_schedule_grows_and_is_capped() {
        let delays: Vec<_> = RetryPolicy::new(10, Duration::from_secs(1)).delays().collect();
        assert_eq!(delays.len(), 9);
        assert!(delays.iter().all(|d| *d <= MAX_BACKOFF));
    }

    type Step = std::result::Result<HttpResponse, TransportError>;

    struct Flaky(Mutex<Vec<Step>>);

    impl Flaky {
        fn connect_twice_then_ok() -> Self {
            let refused = || Err(TransportError::Connect("refused".into()));
            Self(Mutex::new(vec![refused(), refused(), Ok(HttpResponse::new(200, "{}"))]))
        }

        fn next(&self) -> Step {
            self.0.lock().unwrap().remove(0)
        }
    }

    impl BlockingTransport for Flaky {
        fn send(&self, _request: &HttpRequest) -> Step {
            self.next()
        }
    }

    #[async_trait::async_trait]
    impl AsyncTransport for Flaky {
        async fn send(&self, _request: &HttpRequest) -> Step {
            self.next()
        }
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_warnings(run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn assert_retry_warnings(logs: &str) {
        let lines: Vec<_> = logs.lines().filter(|l| l.contains("transport failure, retrying")).collect();
        assert_eq!(lines.len(), 2, "{logs}");
        for (line, attempt) in lines.iter().zip(["attempt=1", "attempt=2"]) {
            assert!(line.contains(attempt), "{line}");
            assert!(line.contains("delay="), "{line}");
            assert!(line.contains("connection failed: refused"), "{line}");
        }
    }

    #[test]
    fn blocking_retry_warning_carries_delay() {
        let pipeline = Pipeline::new(&ClientConfig::builder().retry_backoff(Duration::from_millis(1)).build().unwrap())
            .unwrap();
        let transport = Flaky::connect_twice_then_ok();

        let logs = capture_warnings(|| {
            pipeline
                .execute_blocking(&transport, Method::GET, "/health", None, None)
                .unwrap();
        });
        assert_retry_warnings(&logs);
    }

    #[test]
    fn async_retry_warning_carries_delay() {
        let pipeline = Pipeline::new(&ClientConfig::builder().retry_backoff(Duration::from_millis(1)).build().unwrap())
            .unwrap();
        let transport = Flaky::connect_twice_then_ok();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let logs = capture_warnings(|| {
            runtime
                .block_on(pipeline.execute(&transport, Method::GET, "/health", None, None))
                .unwrap();
        });
        assert_retry_warnings(&logs);
    }
}
