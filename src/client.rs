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

use atlas_dns_macros::facade_methods;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{
    AnalyticsData, BulkOperation, DnsQuery, DnssecConfig, GeoDnsRule, HealthCheck, Payload, QueryResult, Record,
    SystemStatus, TrafficPolicy, WebhookEndpoint, Zone,
};
use crate::operations::{self, Operation};
use crate::pipeline::{Pipeline, QueryParams};
use crate::transport::{AsyncTransport, BlockingReqwestTransport, BlockingTransport, BoxFuture, ReqwestTransport};

// One table, expanded into both clients.
macro_rules! for_each_operation {
    ($mode:ident) => {
        facade_methods! { $mode;
            /// List all DNS zones.
            fn list_zones(params: impl Into<QueryParams>) -> Result<Vec<Zone>> => operations::list_zones;
            /// Get a specific zone by ID.
            fn get_zone(zone_id: &str) -> Result<Zone> => operations::get_zone;
            /// Create a new DNS zone.
            fn create_zone(zone: impl Into<Payload<Zone>>) -> Result<Zone> => operations::create_zone;
            /// Update an existing zone.
            fn update_zone(zone_id: &str, updates: impl Into<Payload<Zone>>) -> Result<Zone> => operations::update_zone;
            /// Delete a zone. Failure is reported through the error, never as `false`.
            fn delete_zone(zone_id: &str) -> Result<bool> => operations::delete_zone;
            /// Validate zone configuration.
            fn validate_zone(zone_id: &str) -> Result<Value> => operations::validate_zone;

            /// List all records in a zone.
            fn list_records(zone_id: &str, params: impl Into<QueryParams>) -> Result<Vec<Record>> => operations::list_records;
            fn get_record(zone_id: &str, record_id: &str) -> Result<Record> => operations::get_record;
            fn create_record(zone_id: &str, record: impl Into<Payload<Record>>) -> Result<Record> => operations::create_record;
            fn update_record(zone_id: &str, record_id: &str, updates: impl Into<Payload<Record>>) -> Result<Record> => operations::update_record;
            fn delete_record(zone_id: &str, record_id: &str) -> Result<bool> => operations::delete_record;
            /// Create multiple records at once.
            fn bulk_create_records(
                zone_id: &str,
                records: impl IntoIterator<Item = impl Into<Payload<Record>>>
            ) -> Result<Vec<Record>> => operations::bulk_create_records;

            /// Submit a bulk operation. The server's result is returned as-is.
            fn execute_bulk_operation(operation: impl Into<Payload<BulkOperation>>) -> Result<Value> => operations::execute_bulk_operation;

            fn list_health_checks(params: impl Into<QueryParams>) -> Result<Vec<HealthCheck>> => operations::list_health_checks;
            fn get_health_check(check_id: &str) -> Result<HealthCheck> => operations::get_health_check;
            fn create_health_check(health_check: impl Into<Payload<HealthCheck>>) -> Result<HealthCheck> => operations::create_health_check;
            fn update_health_check(check_id: &str, updates: impl Into<Payload<HealthCheck>>) -> Result<HealthCheck> => operations::update_health_check;
            fn delete_health_check(check_id: &str) -> Result<bool> => operations::delete_health_check;
            /// Run a health check once and return the probe result.
            fn test_health_check(check_id: &str) -> Result<Value> => operations::test_health_check;

            fn list_traffic_policies(params: impl Into<QueryParams>) -> Result<Vec<TrafficPolicy>> => operations::list_traffic_policies;
            fn get_traffic_policy(policy_id: &str) -> Result<TrafficPolicy> => operations::get_traffic_policy;
            fn create_traffic_policy(policy: impl Into<Payload<TrafficPolicy>>) -> Result<TrafficPolicy> => operations::create_traffic_policy;
            fn update_traffic_policy(policy_id: &str, updates: impl Into<Payload<TrafficPolicy>>) -> Result<TrafficPolicy> => operations::update_traffic_policy;
            fn delete_traffic_policy(policy_id: &str) -> Result<bool> => operations::delete_traffic_policy;
            /// Evaluate a policy against simulated query parameters.
            fn simulate_traffic_policy(policy_id: &str, params: Value) -> Result<Value> => operations::simulate_traffic_policy;

            fn list_geodns_rules(params: impl Into<QueryParams>) -> Result<Vec<GeoDnsRule>> => operations::list_geodns_rules;
            fn get_geodns_rule(rule_id: &str) -> Result<GeoDnsRule> => operations::get_geodns_rule;
            fn create_geodns_rule(rule: impl Into<Payload<GeoDnsRule>>) -> Result<GeoDnsRule> => operations::create_geodns_rule;
            fn update_geodns_rule(rule_id: &str, updates: impl Into<Payload<GeoDnsRule>>) -> Result<GeoDnsRule> => operations::update_geodns_rule;
            fn delete_geodns_rule(rule_id: &str) -> Result<bool> => operations::delete_geodns_rule;
            /// Regions available for GeoDNS rules.
            fn get_geodns_regions() -> Result<Vec<Value>> => operations::get_geodns_regions;

            fn get_dnssec_status(zone_id: &str) -> Result<DnssecConfig> => operations::get_dnssec_status;
            fn enable_dnssec(zone_id: &str, config: impl Into<Payload<DnssecConfig>>) -> Result<DnssecConfig> => operations::enable_dnssec;
            fn disable_dnssec(zone_id: &str) -> Result<bool> => operations::disable_dnssec;
            fn rotate_dnssec_keys(zone_id: &str) -> Result<DnssecConfig> => operations::rotate_dnssec_keys;

            fn get_analytics_overview(params: impl Into<QueryParams>) -> Result<AnalyticsData> => operations::get_analytics_overview;
            fn get_query_analytics(params: impl Into<QueryParams>) -> Result<Value> => operations::get_query_analytics;
            fn get_performance_metrics(params: impl Into<QueryParams>) -> Result<Value> => operations::get_performance_metrics;
            fn get_geographic_analytics(params: impl Into<QueryParams>) -> Result<Value> => operations::get_geographic_analytics;
            /// Most queried domains.
            fn get_top_domains(params: impl Into<QueryParams>) -> Result<Vec<Value>> => operations::get_top_domains;

            /// Resolve a name through the server. A bare domain queries the `A` record.
            fn query_dns(query: impl Into<DnsQuery>) -> Result<QueryResult> => operations::query_dns;

            fn get_system_status() -> Result<SystemStatus> => operations::get_system_status;
            fn get_metrics(params: impl Into<QueryParams>) -> Result<Value> => operations::get_metrics;

            fn list_webhooks(params: impl Into<QueryParams>) -> Result<Vec<WebhookEndpoint>> => operations::list_webhooks;
            fn get_webhook(webhook_id: &str) -> Result<WebhookEndpoint> => operations::get_webhook;
            fn create_webhook(webhook: impl Into<Payload<WebhookEndpoint>>) -> Result<WebhookEndpoint> => operations::create_webhook;
            fn update_webhook(webhook_id: &str, updates: impl Into<Payload<WebhookEndpoint>>) -> Result<WebhookEndpoint> => operations::update_webhook;
            fn delete_webhook(webhook_id: &str) -> Result<bool> => operations::delete_webhook;
            /// Ask the server to send a test delivery.
            fn test_webhook(webhook_id: &str) -> Result<Value> => operations::test_webhook;
        }
    };
}

/// Blocking client. Every call occupies the calling thread for the whole
/// round trip, including backoff waits.
///
/// The client owns its transport; [`close`](Self::close), [`scoped`](Self::scoped)
/// or simply dropping the client releases it.
pub struct AtlasDnsClient<T: BlockingTransport = BlockingReqwestTransport> {
    config: ClientConfig,
    pipeline: Pipeline,
    transport: T,
}

impl AtlasDnsClient {
    /// Opens a client over a pooled reqwest connection.
    ///
    /// Must not be called from within an async runtime; use [`AsyncAtlasDnsClient`] there.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = BlockingReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: BlockingTransport> AtlasDnsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let pipeline = Pipeline::new(&config)?;
        debug!(base_url = config.base_url(), "client opened");
        Ok(Self {
            config,
            pipeline,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Calls an arbitrary endpoint. `path` is relative to `/api/v2`.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<Value> {
        self.pipeline.execute_blocking(&self.transport, method, path, params, body)
    }

    /// Releases the transport.
    pub fn close(self) {
        drop(self);
    }

    /// Runs `f` with the client and closes it afterwards, whatever `f` returns.
    pub fn scoped<R>(self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let result = f(&self);
        self.close();
        result
    }

    fn call<R>(&self, operation: Result<Operation<R>>) -> Result<R> {
        let (method, path, params, body, decode) = operation?.into_parts();
        let value = self.request(method, &path, Some(&params), body)?;
        decode(value)
    }

    for_each_operation!(blocking);
}

impl<T: BlockingTransport> Drop for AtlasDnsClient<T> {
    fn drop(&mut self) {
        debug!(base_url = self.config.base_url(), "client closed");
    }
}

/// Async client. Calls suspend only inside the transport and hold no locks,
/// so one instance can serve many concurrent calls.
///
/// Each call retries independently. To bound a call, wrap it in
/// `tokio::time::timeout`: dropping the future abandons the in-flight attempt
/// and any pending backoff, and no partial result is produced.
pub struct AsyncAtlasDnsClient<T: AsyncTransport = ReqwestTransport> {
    config: ClientConfig,
    pipeline: Pipeline,
    transport: T,
}

impl AsyncAtlasDnsClient {
    /// Opens a client over a pooled reqwest connection.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: AsyncTransport> AsyncAtlasDnsClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let pipeline = Pipeline::new(&config)?;
        debug!(base_url = config.base_url(), "async client opened");
        Ok(Self {
            config,
            pipeline,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Calls an arbitrary endpoint. `path` is relative to `/api/v2`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<Value>,
    ) -> Result<Value> {
        self.pipeline.execute(&self.transport, method, path, params, body).await
    }

    /// Releases the transport.
    pub fn close(self) {
        drop(self);
    }

    /// Runs `f` with the client and closes it afterwards, whatever `f` returns.
    ///
    /// ```no_run
    /// # async fn demo() -> atlas_dns_sdk::error::Result<()> {
    /// use atlas_dns_sdk::{AsyncAtlasDnsClient, ClientConfig, ListParams};
    ///
    /// let client = AsyncAtlasDnsClient::new(ClientConfig::default())?;
    /// let zones = client
    ///     .scoped(|c| Box::pin(async move { c.list_zones(ListParams::new()).await }))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<R, F>(self, f: F) -> Result<R>
    where
        F: for<'c> FnOnce(&'c Self) -> BoxFuture<'c, Result<R>>,
    {
        let result = f(&self).await;
        self.close();
        result
    }

    async fn call<R>(&self, operation: Result<Operation<R>>) -> Result<R> {
        let (method, path, params, body, decode) = operation?.into_parts();
        let value = self.request(method, &path, Some(&params), body).await?;
        decode(value)
    }

    for_each_operation!(suspending);
}

impl<T: AsyncTransport> Drop for AsyncAtlasDnsClient<T> {
    fn drop(&mut self) {
        debug!(base_url = self.config.base_url(), "async client closed");
    }
}
