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

use std::time::Duration;

use reqwest::Url;

use crate::error::{AtlasDnsError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5380";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_USER_AGENT: &str = concat!("atlas-dns-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Connection settings shared by both clients.
///
/// Built through [`ClientConfig::builder`]; the client keeps its own copy and
/// never changes it after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: u32,
    verify_ssl: bool,
    retry_backoff: Duration,
    user_agent: String,
}

impl ClientConfig {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Loads settings from `ATLAS_HOST`, `ATLAS_API_KEY`, `ATLAS_TIMEOUT`,
    /// `ATLAS_MAX_RETRIES` and `ATLAS_VERIFY_SSL`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut builder = ClientBuilder::default();
        for (var, key) in [
            ("ATLAS_HOST", "base_url"),
            ("ATLAS_API_KEY", "api_key"),
            ("ATLAS_TIMEOUT", "timeout"),
            ("ATLAS_MAX_RETRIES", "max_retries"),
            ("ATLAS_VERIFY_SSL", "verify_ssl"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_param(key, &value)?;
            }
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// Unit of the exponential backoff schedule. Waits grow as 2x, 4x, 8x of it.
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            verify_ssl: true,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    verify_ssl: Option<bool>,
    retry_backoff: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = Some(verify_ssl);
        self
    }

    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = Some(retry_backoff);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets a configuration parameter from its string form.
    ///
    /// Supported keys:
    /// - "base_url"
    /// - "api_key"
    /// - "timeout" (seconds, fractional allowed)
    /// - "max_retries"
    /// - "verify_ssl" (`true`/`false`/`1`/`0`)
    pub fn set_param(self, key: &str, value: &str) -> Result<Self> {
        let invalid = |reason: &str| AtlasDnsError::Config(format!("{key}: {reason} ({value:?})"));
        Ok(match key {
            "base_url" => self.base_url(value),
            "api_key" => self.api_key(value),
            "timeout" => {
                let secs: f64 = value.trim().parse().map_err(|_| invalid("expected seconds"))?;
                let timeout = Duration::try_from_secs_f64(secs).map_err(|_| invalid("out of range"))?;
                self.timeout(timeout)
            }
            "max_retries" => {
                let retries = value.trim().parse().map_err(|_| invalid("expected an integer"))?;
                self.max_retries(retries)
            }
            "verify_ssl" => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => self.verify_ssl(true),
                "false" | "0" | "no" => self.verify_ssl(false),
                _ => return Err(invalid("expected a boolean")),
            },
            _ => return Err(AtlasDnsError::Config(format!("unknown parameter: {key}"))),
        })
    }

    /// Validates the settings and produces the immutable configuration.
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let base_url = self.base_url.unwrap_or(defaults.base_url);
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| AtlasDnsError::Config(format!("invalid base_url {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(AtlasDnsError::Config(format!(
                "base_url must be an http(s) URL: {base_url:?}"
            )));
        }

        if let Some(key) = &self.api_key {
            if key.is_empty() || key.chars().any(char::is_control) {
                return Err(AtlasDnsError::Config("api_key must be a non-empty header value".into()));
            }
        }

        Ok(ClientConfig {
            base_url,
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
            retry_backoff: self.retry_backoff.unwrap_or(defaults.retry_backoff),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        })
    }
}
