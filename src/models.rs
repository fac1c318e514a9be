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

//! Resource models exchanged with the server.
//!
//! Models are plain data: they are decoded fresh from every response and carry
//! no behaviour beyond (de)serialization. Fields the server may omit are
//! optional and skipped when unset, so a model built locally serializes to the
//! same body as the equivalent hand-written JSON object.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AtlasDnsError, Result};
use crate::pipeline::QueryParams;
use crate::utils::serde_utils::{is_null_or_none, map_is_empty, vec_is_empty};

/// Write argument accepting either a typed model or an equivalent plain JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<M> {
    Model(M),
    Plain(Value),
}

impl<M: Serialize> Payload<M> {
    /// Converts the payload into the JSON body sent to the server.
    pub fn flatten(self) -> Result<Value> {
        match self {
            Payload::Model(model) => serde_json::to_value(model).map_err(AtlasDnsError::Encode),
            Payload::Plain(value) => Ok(value),
        }
    }
}

macro_rules! payload_conversions {
    ($($model:ty),* $(,)?) => {
        $(
            impl From<$model> for Payload<$model> {
                fn from(model: $model) -> Self {
                    Payload::Model(model)
                }
            }

            impl From<Value> for Payload<$model> {
                fn from(value: Value) -> Self {
                    Payload::Plain(value)
                }
            }

            impl From<Map<String, Value>> for Payload<$model> {
                fn from(map: Map<String, Value>) -> Self {
                    Payload::Plain(Value::Object(map))
                }
            }
        )*
    };
}

payload_conversions!(Zone, Record, HealthCheck, TrafficPolicy, GeoDnsRule, DnssecConfig, WebhookEndpoint, BulkOperation);

fn default_zone_type() -> String {
    "primary".to_string()
}

/// A DNS zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// `primary` or `secondary`.
    #[serde(rename = "type", alias = "zone_type", default = "default_zone_type")]
    pub zone_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soa: Option<SoaRecord>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnssec_enabled: Option<bool>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            zone_type: default_zone_type(),
            soa: None,
            nameservers: Vec::new(),
            status: None,
            record_count: None,
            dnssec_enabled: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn zone_type(mut self, zone_type: impl Into<String>) -> Self {
        self.zone_type = zone_type.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaRecord {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Resource record types understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    #[default]
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
    Caa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Soa => "SOA",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
            RecordType::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = AtlasDnsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "SOA" => RecordType::Soa,
            "SRV" => RecordType::Srv,
            "TXT" => RecordType::Txt,
            "CAA" => RecordType::Caa,
            _ => return Err(AtlasDnsError::Config(format!("unsupported record type: {s}"))),
        })
    }
}

/// A resource record within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub name: String,
    #[serde(rename = "type", alias = "record_type")]
    pub record_type: RecordType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// MX and SRV only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Record {
    pub fn new(name: impl Into<String>, record_type: RecordType, value: impl Into<String>) -> Self {
        Self {
            id: None,
            zone: None,
            name: name.into(),
            record_type,
            value: value.into(),
            ttl: None,
            priority: None,
            weight: None,
            port: None,
            enabled: None,
        }
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Probe kind: `http`, `https`, `tcp` or `dns`.
    #[serde(rename = "type")]
    pub check_type: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Seconds between probes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    /// Seconds before a probe counts as failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "is_null_or_none")]
    pub last_result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficEndpoint {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_id: Option<String>,
}

/// Rule set controlling how answers are selected and weighted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// `weighted`, `failover`, `latency`, ...
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub endpoints: Vec<TrafficEndpoint>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub rules: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoDnsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,
    /// Region codes (continents, countries, subdivisions) the rule matches.
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub answers: Vec<String>,
    #[serde(default, skip_serializing_if = "is_null_or_none")]
    pub fallback: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DnssecConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsec3: Option<bool>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub ds_records: Vec<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_rotated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Event type pattern, e.g. `zone.*`.
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Webhook delivery target.
///
/// When `secret` is set the server signs each delivery; see [`crate::webhook`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "vec_is_empty")]
    pub event_filters: Vec<EventFilter>,
    #[serde(default, skip_serializing_if = "map_is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "map_is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkActionKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAction {
    pub action: BulkActionKind,
    /// `zone` or `record`.
    pub resource: String,
    pub data: Value,
}

/// Several mutations submitted in one request and applied server-side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkOperation {
    pub operations: Vec<BulkAction>,
    /// Ask the server to apply all operations or none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<bool>,
}

impl BulkOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, action: BulkActionKind, resource: impl Into<String>, data: Value) -> Self {
        self.operations.push(BulkAction {
            action,
            resource: resource.into(),
            data,
        });
        self
    }

    pub fn transactional(mut self, transaction: bool) -> Self {
        self.transaction = Some(transaction);
        self
    }
}

/// Ad-hoc lookup sent to `POST /query`.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsQuery {
    domain: String,
    record_type: RecordType,
    options: Map<String, Value>,
}

impl DnsQuery {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_type: RecordType::A,
            options: Map::new(),
        }
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Extra body field. Options are applied last and win over `domain`/`type`.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn into_body(self) -> Value {
        let mut body = Map::new();
        body.insert("domain".into(), Value::String(self.domain));
        body.insert("type".into(), Value::String(self.record_type.to_string()));
        body.extend(self.options);
        Value::Object(body)
    }
}

impl From<&str> for DnsQuery {
    fn from(domain: &str) -> Self {
        DnsQuery::new(domain)
    }
}

impl From<String> for DnsQuery {
    fn from(domain: String) -> Self {
        DnsQuery::new(domain)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub domain: String,
    #[serde(rename = "type", default)]
    pub query_type: String,
    #[serde(default)]
    pub answers: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_queries: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_clients: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<f64>,
    /// Any additional series the server reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "map_is_empty")]
    pub components: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Server settings, kept as an open key/value document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

/// Paging and filtering for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub sort: Option<String>,
    pub filter: Option<String>,
    pub fields: Option<String>,
    extra: QueryParams,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Any other query parameter the endpoint understands.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl From<ListParams> for QueryParams {
    fn from(params: ListParams) -> Self {
        let mut query = params.extra;
        let named = [
            ("page", params.page.map(|p| p.to_string())),
            ("per_page", params.per_page.map(|p| p.to_string())),
            ("sort", params.sort),
            ("filter", params.filter),
            ("fields", params.fields),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                query.insert(key.to_string(), value);
            }
        }
        query
    }
}

/// Time window and grouping for analytics endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyticsParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Bucket size, e.g. `1h` or `1d`.
    pub interval: Option<String>,
    pub zone: Option<String>,
    pub limit: Option<u32>,
}

impl AnalyticsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl From<AnalyticsParams> for QueryParams {
    fn from(params: AnalyticsParams) -> Self {
        let timestamp = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
        let named = [
            ("start", params.start.map(timestamp)),
            ("end", params.end.map(timestamp)),
            ("interval", params.interval),
            ("zone", params.zone),
            ("limit", params.limit.map(|l| l.to_string())),
        ];
        named
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect()
    }
}
