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

//! Error types returned by the SDK.
//!
//! Every failure surfaces as an [`AtlasDnsError`]. HTTP status failures map to
//! a fixed set of variants; transport faults are wrapped in [`TransportError`].

use thiserror::Error;

/// Result type used throughout the SDK.
pub type Result<T> = std::result::Result<T, AtlasDnsError>;

/// Root error type for all SDK operations.
#[derive(Debug, Error)]
pub enum AtlasDnsError {
    /// The server rejected the credentials (401) or the caller lacks permission (403).
    #[error("{0}")]
    Authentication(String),

    /// The addressed resource does not exist (404).
    #[error("{0}")]
    ResourceNotFound(String),

    /// The server rejected the request body (422).
    #[error("Validation error: {body}")]
    Validation { body: String },

    /// Too many requests (429).
    #[error("{0}")]
    RateLimit(String),

    /// Any 5xx response.
    #[error("Server error: {status}")]
    Server { status: u16, body: String },

    /// Any other 4xx response.
    #[error("API error: {body}")]
    Api { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A request payload could not be converted to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response did not have the shape of the expected model.
    #[error("unexpected response shape: {0}")]
    Decode(#[source] serde_json::Error),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AtlasDnsError {
    /// HTTP status code of the response this error was built from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication(message) if message == PERMISSION_DENIED => Some(403),
            Self::Authentication(_) => Some(401),
            Self::ResourceNotFound(_) => Some(404),
            Self::Validation { .. } => Some(422),
            Self::RateLimit(_) => Some(429),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Validation { body } | Self::Server { body, .. } | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether this is a transport fault the pipeline would retry.
    pub fn is_retryable_transport(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_retryable())
    }
}

pub(crate) const AUTHENTICATION_FAILED: &str = "Authentication failed";
pub(crate) const PERMISSION_DENIED: &str = "Permission denied";
pub(crate) const RESOURCE_NOT_FOUND: &str = "Resource not found";
pub(crate) const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";

/// Failures raised below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The attempt did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Only timeouts and connection failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_server_contract() {
        let err = AtlasDnsError::Validation { body: "{\"field\":\"name\"}".into() };
        assert_eq!(err.to_string(), "Validation error: {\"field\":\"name\"}");

        let err = AtlasDnsError::Server { status: 502, body: String::new() };
        assert_eq!(err.to_string(), "Server error: 502");

        let err = AtlasDnsError::Api { status: 409, body: "conflict".into() };
        assert_eq!(err.to_string(), "API error: conflict");
    }

    #[test]
    fn status_is_recovered_from_variant() {
        assert_eq!(AtlasDnsError::Authentication(AUTHENTICATION_FAILED.into()).status(), Some(401));
        assert_eq!(AtlasDnsError::Authentication(PERMISSION_DENIED.into()).status(), Some(403));
        assert_eq!(AtlasDnsError::RateLimit(RATE_LIMIT_EXCEEDED.into()).status(), Some(429));
        assert_eq!(AtlasDnsError::Config("bad".into()).status(), None);
    }

    #[test]
    fn only_timeouts_and_connect_failures_are_retryable() {
        assert!(TransportError::Timeout("t".into()).is_retryable());
        assert!(TransportError::Connect("c".into()).is_retryable());
        assert!(!TransportError::Request("r".into()).is_retryable());
        assert!(!TransportError::Body("b".into()).is_retryable());

        let err: AtlasDnsError = TransportError::Connect("refused".into()).into();
        assert!(err.is_retryable_transport());
    }
}
