mod common;

use std::sync::Arc;
use std::time::Duration;

use atlas_dns_sdk::transport::HttpResponse;
use atlas_dns_sdk::{
    AsyncAtlasDnsClient, AtlasDnsError, BulkActionKind, BulkOperation, ListParams, Method, TransportError, Zone,
};
use common::{FAILING_STATUSES, HangingTransport, ScriptedTransport, connect_failure, test_config};
use pretty_assertions::assert_eq;
use serde_json::json;

fn client(transport: &Arc<ScriptedTransport>) -> AsyncAtlasDnsClient<Arc<ScriptedTransport>> {
    AsyncAtlasDnsClient::with_transport(test_config(), Arc::clone(transport)).unwrap()
}

#[tokio::test]
async fn create_zone_posts_payload_and_decodes_reply() {
    let transport = ScriptedTransport::replying(201, r#"{"id":"z-1","name":"example.com","type":"primary"}"#);
    let zone = client(&transport).create_zone(Zone::new("example.com")).await.unwrap();

    assert_eq!(zone.id.as_deref(), Some("z-1"));
    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url, "http://dns.test:5380/api/v2/zones");
    assert_eq!(request.body, Some(json!({"name": "example.com", "type": "primary"})));
}

#[tokio::test]
async fn every_error_status_maps_like_the_blocking_client() {
    for status in FAILING_STATUSES {
        let transport = ScriptedTransport::replying(status, "oops");
        let err = client(&transport)
            .request(Method::GET, "/zones", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(status));
        assert_eq!(transport.requests().len(), 1, "{status}");
        if status == 422 || status == 418 || status >= 500 {
            assert_eq!(err.body(), Some("oops"));
        }
    }
}

#[tokio::test]
async fn delete_record_on_missing_record_is_not_found() {
    let transport = ScriptedTransport::replying(404, "");
    let err = client(&transport).delete_record("z-1", "r-9").await.unwrap_err();
    assert!(matches!(err, AtlasDnsError::ResourceNotFound(_)));
}

#[tokio::test]
async fn connection_failures_are_retried_until_success() {
    let transport = ScriptedTransport::new([
        connect_failure(),
        Err(TransportError::Timeout("read timed out".into())),
        Ok(HttpResponse::new(200, r#"[{"name":"example.com","type":"primary"}]"#)),
    ]);
    let zones = client(&transport).list_zones(ListParams::new()).await.unwrap();

    assert_eq!(zones.len(), 1);
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_transport_error() {
    let transport = ScriptedTransport::new([connect_failure(), connect_failure(), connect_failure()]);
    let err = client(&transport)
        .request(Method::GET, "/health", None, None)
        .await
        .unwrap_err();

    assert!(err.is_retryable_transport());
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn body_errors_are_not_retried() {
    let transport = ScriptedTransport::new([Err(TransportError::Body("truncated".into()))]);
    let err = client(&transport)
        .request(Method::GET, "/health", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AtlasDnsError::Transport(TransportError::Body(_))));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn bulk_operation_result_is_returned_as_is() {
    let transport = ScriptedTransport::replying(200, r#"{"succeeded":2,"failed":0}"#);
    let operation = BulkOperation::new()
        .push(BulkActionKind::Create, "record", json!({"name": "a"}))
        .push(BulkActionKind::Delete, "record", json!({"id": "r-1"}));

    let result = client(&transport).execute_bulk_operation(operation).await.unwrap();
    assert_eq!(result, json!({"succeeded": 2, "failed": 0}));
    assert_eq!(transport.last_request().url, "http://dns.test:5380/api/v2/bulk");
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let transport = ScriptedTransport::new([
        Ok(HttpResponse::new(200, r#"{"name":"a.example","type":"primary"}"#)),
        Ok(HttpResponse::new(200, r#"{"name":"a.example","type":"primary"}"#)),
    ]);
    let client = client(&transport);

    let (first, second) = tokio::join!(client.get_zone("z-1"), client.get_zone("z-2"));
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn deadline_cancels_the_call() {
    let client = AsyncAtlasDnsClient::with_transport(test_config(), HangingTransport).unwrap();

    let outcome = tokio::time::timeout(Duration::from_millis(20), client.get_system_status()).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn scoped_runs_the_closure_and_releases_the_transport() {
    let transport = ScriptedTransport::replying(200, r#"{"status":"healthy","version":"2.0"}"#);

    let status = client(&transport)
        .scoped(|c| Box::pin(async move { c.get_system_status().await }))
        .await
        .unwrap();

    assert_eq!(status.status, "healthy");
    assert_eq!(transport.last_request().url, "http://dns.test:5380/api/v2/monitoring/status");
    assert_eq!(Arc::strong_count(&transport), 1);
}
