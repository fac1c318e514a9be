//! Client SDK for the Atlas DNS server HTTP API
//!
//! Supported features:
//! - Zones, records, health checks, traffic policies, GeoDNS, DNSSEC,
//!   analytics, ad-hoc queries, monitoring and webhooks
//! - Blocking and asynchronous clients with identical operations
//! - Typed errors for every failing HTTP status
//! - Automatic retry of timeouts and connection failures
//!
//! # Example
//! ```no_run
//! use atlas_dns_sdk::{AtlasDnsClient, ClientConfig, Zone};
//!
//! # fn main() -> atlas_dns_sdk::error::Result<()> {
//! let config = ClientConfig::builder()
//!     .set_param("base_url", "http://localhost:5380")?
//!     .set_param("api_key", "your_key")?
//!     .build()?;
//!
//! let client = AtlasDnsClient::new(config)?;
//! let zone = client.create_zone(Zone::new("example.com"))?;
//! client.delete_zone(zone.id.as_deref().unwrap_or_default())?;
//! client.close();
//! # Ok(())
//! # }
//! ```

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

pub(crate) mod utils;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod pipeline;
pub mod transport;
pub mod webhook;

pub use client::{AsyncAtlasDnsClient, AtlasDnsClient};
pub use config::{ClientBuilder, ClientConfig};
pub use error::{AtlasDnsError, Result, TransportError};
pub use models::{
    AnalyticsData, AnalyticsParams, BulkAction, BulkActionKind, BulkOperation, DnsQuery, DnssecConfig, EventFilter,
    GeoDnsRule, HealthCheck, ListParams, Payload, QueryResult, Record, RecordType, Settings, SoaRecord, SystemStatus,
    TrafficEndpoint, TrafficPolicy, User, WebhookEndpoint, Zone,
};
pub use pipeline::QueryParams;
pub use reqwest::Method;
