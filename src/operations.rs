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

//! Endpoint table.
//!
//! Each function describes one API operation as an [`Operation`]: the method,
//! the path relative to `/api/v2`, query params, JSON body and how to decode
//! the result. Both clients execute the same descriptors.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{AtlasDnsError, Result};
use crate::models::{
    AnalyticsData, BulkOperation, DnsQuery, DnssecConfig, GeoDnsRule, HealthCheck, Payload, QueryResult, Record,
    SystemStatus, TrafficPolicy, WebhookEndpoint, Zone,
};
use crate::pipeline::QueryParams;

pub(crate) type Decoder<R> = fn(Value) -> Result<R>;

/// A single API call, not yet executed.
#[derive(Debug, Clone)]
pub struct Operation<R> {
    method: Method,
    path: String,
    params: QueryParams,
    body: Option<Value>,
    decode: Decoder<R>,
}

impl<R: DeserializeOwned> Operation<R> {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
            decode: decode_json::<R>,
        }
    }
}

impl Operation<bool> {
    /// Operation whose success is signalled by the status alone.
    fn acknowledged(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
            decode: acknowledge,
        }
    }
}

impl<R> Operation<R> {
    fn with_params(mut self, params: impl Into<QueryParams>) -> Self {
        self.params = params.into();
        self
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Converts the decoded response body into the operation's result type.
    pub fn decode(&self, value: Value) -> Result<R> {
        (self.decode)(value)
    }

    pub(crate) fn into_parts(self) -> (Method, String, QueryParams, Option<Value>, Decoder<R>) {
        (self.method, self.path, self.params, self.body, self.decode)
    }
}

fn decode_json<R: DeserializeOwned>(value: Value) -> Result<R> {
    serde_json::from_value(value).map_err(AtlasDnsError::Decode)
}

fn acknowledge(_: Value) -> Result<bool> {
    Ok(true)
}

// Zones

pub fn list_zones(params: impl Into<QueryParams>) -> Result<Operation<Vec<Zone>>> {
    Ok(Operation::new(Method::GET, "/zones").with_params(params))
}

pub fn get_zone(zone_id: &str) -> Result<Operation<Zone>> {
    Ok(Operation::new(Method::GET, format!("/zones/{zone_id}")))
}

pub fn create_zone(zone: impl Into<Payload<Zone>>) -> Result<Operation<Zone>> {
    Ok(Operation::new(Method::POST, "/zones").with_body(zone.into().flatten()?))
}

pub fn update_zone(zone_id: &str, updates: impl Into<Payload<Zone>>) -> Result<Operation<Zone>> {
    Ok(Operation::new(Method::PUT, format!("/zones/{zone_id}")).with_body(updates.into().flatten()?))
}

pub fn delete_zone(zone_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::DELETE, format!("/zones/{zone_id}")))
}

pub fn validate_zone(zone_id: &str) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::GET, format!("/zones/{zone_id}/validate")))
}

// Records

pub fn list_records(zone_id: &str, params: impl Into<QueryParams>) -> Result<Operation<Vec<Record>>> {
    Ok(Operation::new(Method::GET, format!("/zones/{zone_id}/records")).with_params(params))
}

pub fn get_record(zone_id: &str, record_id: &str) -> Result<Operation<Record>> {
    Ok(Operation::new(Method::GET, format!("/zones/{zone_id}/records/{record_id}")))
}

pub fn create_record(zone_id: &str, record: impl Into<Payload<Record>>) -> Result<Operation<Record>> {
    Ok(Operation::new(Method::POST, format!("/zones/{zone_id}/records")).with_body(record.into().flatten()?))
}

pub fn update_record(zone_id: &str, record_id: &str, updates: impl Into<Payload<Record>>) -> Result<Operation<Record>> {
    Ok(Operation::new(Method::PUT, format!("/zones/{zone_id}/records/{record_id}"))
        .with_body(updates.into().flatten()?))
}

pub fn delete_record(zone_id: &str, record_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(
        Method::DELETE,
        format!("/zones/{zone_id}/records/{record_id}"),
    ))
}

/// Body is `{"records": [...]}`; the server answers with the created records in order.
pub fn bulk_create_records<I, P>(zone_id: &str, records: I) -> Result<Operation<Vec<Record>>>
where
    I: IntoIterator<Item = P>,
    P: Into<Payload<Record>>,
{
    let records = records
        .into_iter()
        .map(|record| record.into().flatten())
        .collect::<Result<Vec<_>>>()?;
    Ok(Operation::new(Method::POST, format!("/zones/{zone_id}/records/bulk")).with_body(json!({ "records": records })))
}

// Bulk

pub fn execute_bulk_operation(operation: impl Into<Payload<BulkOperation>>) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::POST, "/bulk").with_body(operation.into().flatten()?))
}

// Health checks

pub fn list_health_checks(params: impl Into<QueryParams>) -> Result<Operation<Vec<HealthCheck>>> {
    Ok(Operation::new(Method::GET, "/health-checks").with_params(params))
}

pub fn get_health_check(check_id: &str) -> Result<Operation<HealthCheck>> {
    Ok(Operation::new(Method::GET, format!("/health-checks/{check_id}")))
}

pub fn create_health_check(health_check: impl Into<Payload<HealthCheck>>) -> Result<Operation<HealthCheck>> {
    Ok(Operation::new(Method::POST, "/health-checks").with_body(health_check.into().flatten()?))
}

pub fn update_health_check(check_id: &str, updates: impl Into<Payload<HealthCheck>>) -> Result<Operation<HealthCheck>> {
    Ok(Operation::new(Method::PUT, format!("/health-checks/{check_id}")).with_body(updates.into().flatten()?))
}

pub fn delete_health_check(check_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::DELETE, format!("/health-checks/{check_id}")))
}

pub fn test_health_check(check_id: &str) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::POST, format!("/health-checks/{check_id}/test")))
}

// Traffic policies

pub fn list_traffic_policies(params: impl Into<QueryParams>) -> Result<Operation<Vec<TrafficPolicy>>> {
    Ok(Operation::new(Method::GET, "/traffic-policies").with_params(params))
}

pub fn get_traffic_policy(policy_id: &str) -> Result<Operation<TrafficPolicy>> {
    Ok(Operation::new(Method::GET, format!("/traffic-policies/{policy_id}")))
}

pub fn create_traffic_policy(policy: impl Into<Payload<TrafficPolicy>>) -> Result<Operation<TrafficPolicy>> {
    Ok(Operation::new(Method::POST, "/traffic-policies").with_body(policy.into().flatten()?))
}

pub fn update_traffic_policy(
    policy_id: &str,
    updates: impl Into<Payload<TrafficPolicy>>,
) -> Result<Operation<TrafficPolicy>> {
    Ok(Operation::new(Method::PUT, format!("/traffic-policies/{policy_id}")).with_body(updates.into().flatten()?))
}

pub fn delete_traffic_policy(policy_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::DELETE, format!("/traffic-policies/{policy_id}")))
}

pub fn simulate_traffic_policy(policy_id: &str, params: Value) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::POST, format!("/traffic-policies/{policy_id}/simulate")).with_body(params))
}

// GeoDNS

pub fn list_geodns_rules(params: impl Into<QueryParams>) -> Result<Operation<Vec<GeoDnsRule>>> {
    Ok(Operation::new(Method::GET, "/geodns").with_params(params))
}

pub fn get_geodns_rule(rule_id: &str) -> Result<Operation<GeoDnsRule>> {
    Ok(Operation::new(Method::GET, format!("/geodns/{rule_id}")))
}

pub fn create_geodns_rule(rule: impl Into<Payload<GeoDnsRule>>) -> Result<Operation<GeoDnsRule>> {
    Ok(Operation::new(Method::POST, "/geodns").with_body(rule.into().flatten()?))
}

pub fn update_geodns_rule(rule_id: &str, updates: impl Into<Payload<GeoDnsRule>>) -> Result<Operation<GeoDnsRule>> {
    Ok(Operation::new(Method::PUT, format!("/geodns/{rule_id}")).with_body(updates.into().flatten()?))
}

pub fn delete_geodns_rule(rule_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::DELETE, format!("/geodns/{rule_id}")))
}

pub fn get_geodns_regions() -> Result<Operation<Vec<Value>>> {
    Ok(Operation::new(Method::GET, "/geodns/regions"))
}

// DNSSEC

pub fn get_dnssec_status(zone_id: &str) -> Result<Operation<DnssecConfig>> {
    Ok(Operation::new(Method::GET, format!("/zones/{zone_id}/dnssec")))
}

pub fn enable_dnssec(zone_id: &str, config: impl Into<Payload<DnssecConfig>>) -> Result<Operation<DnssecConfig>> {
    Ok(Operation::new(Method::POST, format!("/zones/{zone_id}/dnssec/enable")).with_body(config.into().flatten()?))
}

pub fn disable_dnssec(zone_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::POST, format!("/zones/{zone_id}/dnssec/disable")))
}

pub fn rotate_dnssec_keys(zone_id: &str) -> Result<Operation<DnssecConfig>> {
    Ok(Operation::new(Method::POST, format!("/zones/{zone_id}/dnssec/rotate-keys")))
}

// Analytics

pub fn get_analytics_overview(params: impl Into<QueryParams>) -> Result<Operation<AnalyticsData>> {
    Ok(Operation::new(Method::GET, "/analytics/overview").with_params(params))
}

pub fn get_query_analytics(params: impl Into<QueryParams>) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::GET, "/analytics/queries").with_params(params))
}

pub fn get_performance_metrics(params: impl Into<QueryParams>) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::GET, "/analytics/performance").with_params(params))
}

pub fn get_geographic_analytics(params: impl Into<QueryParams>) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::GET, "/analytics/geography").with_params(params))
}

pub fn get_top_domains(params: impl Into<QueryParams>) -> Result<Operation<Vec<Value>>> {
    Ok(Operation::new(Method::GET, "/analytics/top-domains").with_params(params))
}

// Query

pub fn query_dns(query: impl Into<DnsQuery>) -> Result<Operation<QueryResult>> {
    Ok(Operation::new(Method::POST, "/query").with_body(query.into().into_body()))
}

// Monitoring

pub fn get_system_status() -> Result<Operation<SystemStatus>> {
    Ok(Operation::new(Method::GET, "/monitoring/status"))
}

pub fn get_metrics(params: impl Into<QueryParams>) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::GET, "/monitoring/metrics").with_params(params))
}

// Webhooks

pub fn list_webhooks(params: impl Into<QueryParams>) -> Result<Operation<Vec<WebhookEndpoint>>> {
    Ok(Operation::new(Method::GET, "/webhooks").with_params(params))
}

pub fn get_webhook(webhook_id: &str) -> Result<Operation<WebhookEndpoint>> {
    Ok(Operation::new(Method::GET, format!("/webhooks/{webhook_id}")))
}

pub fn create_webhook(webhook: impl Into<Payload<WebhookEndpoint>>) -> Result<Operation<WebhookEndpoint>> {
    Ok(Operation::new(Method::POST, "/webhooks").with_body(webhook.into().flatten()?))
}

pub fn update_webhook(
    webhook_id: &str,
    updates: impl Into<Payload<WebhookEndpoint>>,
) -> Result<Operation<WebhookEndpoint>> {
    Ok(Operation::new(Method::PUT, format!("/webhooks/{webhook_id}")).with_body(updates.into().flatten()?))
}

pub fn delete_webhook(webhook_id: &str) -> Result<Operation<bool>> {
    Ok(Operation::acknowledged(Method::DELETE, format!("/webhooks/{webhook_id}")))
}

pub fn test_webhook(webhook_id: &str) -> Result<Operation<Value>> {
    Ok(Operation::new(Method::POST, format!("/webhooks/{webhook_id}/test")))
}
