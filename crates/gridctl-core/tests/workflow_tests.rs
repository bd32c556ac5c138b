//! Workflow tests against a mock control plane
//!
//! These drive the real observer + poller against wiremock sequences, so the
//! probe path (including the 404-as-observation branch) is exercised end to
//! end.

use std::time::Duration;

use grid_api::clusters::{ClusterHandler, CreateClusterRequest};
use grid_api::GridClient;
use gridctl_core::workflows::{
    CreateOutcome, DeleteOutcome, create_cluster, delete_cluster, monitor_create,
};
use gridctl_core::{CoreError, PollConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLUSTER_PATH: &str = "/subscriptions/sub-1/resourceGroups/ops/clusters/etl";

fn handler(server: &MockServer) -> ClusterHandler {
    let client = GridClient::builder()
        .base_url(server.uri())
        .subscription_id("sub-1")
        .token("test-token")
        .build()
        .unwrap();
    ClusterHandler::new(client)
}

fn fast_poll() -> PollConfig {
    PollConfig::new(Duration::from_millis(10), Duration::from_secs(30))
}

fn snapshot_body(provisioning: &str, state: &str) -> serde_json::Value {
    json!({
        "name": "etl",
        "location": "westus",
        "properties": {
            "provisioningState": provisioning,
            "clusterState": state,
            "createdAt": "2026-02-01T10:00:00Z",
            "connectivityEndpoints": [
                {"name": "gateway", "protocol": "https", "location": "etl.gridplatform.io", "port": 443}
            ]
        }
    })
}

fn not_found_body() -> serde_json::Value {
    json!({"error": {"code": "ResourceNotFound", "message": "cluster 'etl' was not found"}})
}

fn create_request() -> CreateClusterRequest {
    serde_json::from_value(json!({
        "location": "westus",
        "properties": {
            "sizeInNodes": 4,
            "login": {"username": "admin", "password": "secret"}
        }
    }))
    .unwrap()
}

async fn mount_accepted(server: &MockServer, http_method: &str) {
    Mock::given(method(http_method))
        .and(path(CLUSTER_PATH))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"operationId": "op-1", "status": "Accepted"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_watches_through_pending_states_to_running() {
    let server = MockServer::start().await;
    mount_accepted(&server, "PUT").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("InProgress", "Accepted")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("Succeeded", "Running")))
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let outcome = create_cluster(&clusters, "ops", "etl", &create_request(), &fast_poll(), false, None)
        .await
        .unwrap();

    match outcome {
        CreateOutcome::Created(cluster) => {
            assert_eq!(cluster.human_state(), "Running");
            assert_eq!(cluster.properties.connectivity_endpoints.len(), 1);
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_failure_without_cleanup_is_an_operation_failure() {
    let server = MockServer::start().await;
    mount_accepted(&server, "PUT").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("Failed", "Error")))
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let err = create_cluster(&clusters, "ops", "etl", &create_request(), &fast_poll(), false, None)
        .await
        .unwrap_err();

    match err {
        CoreError::OperationFailed { name, reason } => {
            assert_eq!(name, "etl");
            assert!(reason.contains("Failed"));
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cleanup_on_error_deletes_after_failed_create() {
    let server = MockServer::start().await;
    mount_accepted(&server, "PUT").await;
    // First observation reports a failed create; everything after the delete
    // submission 404s.
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("Failed", "Error")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(CLUSTER_PATH))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"operationId": "op-2", "status": "Accepted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let outcome = create_cluster(&clusters, "ops", "etl", &create_request(), &fast_poll(), true, None)
        .await
        .unwrap();

    // The delete was submitted and its own observer run completed before the
    // workflow returned; the mock's expect(1) verifies the submission.
    match outcome {
        CreateOutcome::CleanedUp { reason } => assert!(reason.contains("Failed")),
        other => panic!("expected CleanedUp, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_timeout_create_checks_once_and_returns_submitted() {
    let server = MockServer::start().await;
    mount_accepted(&server, "PUT").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("InProgress", "Accepted")))
        .expect(1)
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let config = PollConfig::new(Duration::from_millis(10), Duration::ZERO);
    let outcome = create_cluster(&clusters, "ops", "etl", &create_request(), &config, false, None)
        .await
        .unwrap();

    match outcome {
        CreateOutcome::Submitted { last_observed } => {
            assert_eq!(last_observed.unwrap().human_state(), "Accepted");
        }
        other => panic!("expected Submitted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_of_already_absent_cluster_succeeds_immediately() {
    let server = MockServer::start().await;
    mount_accepted(&server, "DELETE").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .expect(1)
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let outcome = delete_cluster(&clusters, "ops", "etl", &fast_poll(), None)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Deleted));
}

#[tokio::test]
async fn test_delete_waits_for_resource_to_disappear() {
    let server = MockServer::start().await;
    mount_accepted(&server, "DELETE").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("Deleting", "Deleting")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let outcome = delete_cluster(&clusters, "ops", "etl", &fast_poll(), None)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Deleted));
}

#[tokio::test]
async fn test_monitor_create_resumes_without_submitting() {
    let server = MockServer::start().await;
    // No PUT mock mounted: a submission would fail the test
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("Succeeded", "Running")))
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let outcome = monitor_create(&clusters, "ops", "etl", &fast_poll(), None)
        .await
        .unwrap();

    assert!(matches!(outcome, CreateOutcome::Created(_)));
}

#[tokio::test]
async fn test_server_error_during_watch_is_fatal() {
    let server = MockServer::start().await;
    mount_accepted(&server, "DELETE").await;
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "internal"})))
        .mount(&server)
        .await;

    let clusters = handler(&server);
    let err = delete_cluster(&clusters, "ops", "etl", &fast_poll(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Api(_)));
}
