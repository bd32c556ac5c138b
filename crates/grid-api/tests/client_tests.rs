//! Integration tests for the Grid API client against a mock server

use grid_api::clusters::{
    ClusterHandler, CreateClusterProperties, CreateClusterRequest, LoginProfile,
};
use grid_api::tables::TableClient;
use grid_api::{ApiError, AuthClient, GridClient, ProvisioningState, SessionMode};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GridClient {
    GridClient::builder()
        .base_url(server.uri())
        .subscription_id("sub-1")
        .token("test-token")
        .build()
        .unwrap()
}

fn cluster_body(name: &str, provisioning: &str, state: &str) -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/sub-1/resourceGroups/ops/clusters/{name}"),
        "name": name,
        "location": "westus",
        "properties": {
            "provisioningState": provisioning,
            "clusterState": state,
            "createdAt": "2026-02-01T10:00:00Z",
            "sizeInNodes": 4,
            "connectivityEndpoints": [
                {"name": "gateway", "protocol": "https", "location": format!("{name}.gridplatform.io"), "port": 443}
            ]
        }
    })
}

#[tokio::test]
async fn test_get_cluster_returns_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/resourceGroups/ops/clusters/etl-prod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cluster_body("etl-prod", "Succeeded", "Running")))
        .mount(&server)
        .await;

    let handler = ClusterHandler::new(test_client(&server));
    let cluster = handler.get("ops", "etl-prod").await.unwrap();

    assert_eq!(cluster.name, "etl-prod");
    assert_eq!(cluster.properties.provisioning_state, ProvisioningState::Succeeded);
    assert_eq!(cluster.human_state(), "Running");
    assert_eq!(cluster.properties.connectivity_endpoints.len(), 1);
}

#[tokio::test]
async fn test_get_missing_cluster_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/resourceGroups/ops/clusters/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceNotFound", "message": "cluster 'ghost' was not found"}
        })))
        .mount(&server)
        .await;

    let handler = ClusterHandler::new(test_client(&server));
    let err = handler.get("ops", "ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_returns_operation_handle() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/subscriptions/sub-1/resourceGroups/ops/clusters/etl-prod"))
        .and(body_partial_json(json!({"location": "westus"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "operationId": "op-42",
            "status": "Accepted"
        })))
        .mount(&server)
        .await;

    let handler = ClusterHandler::new(test_client(&server));
    let request = CreateClusterRequest {
        location: "westus".into(),
        properties: CreateClusterProperties {
            size_in_nodes: 4,
            login: LoginProfile {
                username: "admin".into(),
                password: "secret".into(),
            },
            ..Default::default()
        },
    };
    let accepted = handler.create("ops", "etl-prod", &request).await.unwrap();
    assert_eq!(accepted.operation_id.as_deref(), Some("op-42"));
}

#[tokio::test]
async fn test_server_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/clusters"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "internal"})))
        .mount(&server)
        .await;

    let handler = ClusterHandler::new(test_client(&server));
    let err = handler.list().await.unwrap_err();
    assert!(matches!(err, ApiError::ServerError { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_list_clusters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/clusters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                cluster_body("etl-prod", "Succeeded", "Running"),
                cluster_body("etl-dev", "Failed", "Error"),
            ]
        })))
        .mount(&server)
        .await;

    let handler = ClusterHandler::new(test_client(&server));
    let clusters = handler.list().await.unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[1].properties.provisioning_state, ProvisioningState::Failed);
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TestRow {
    message: String,
}

#[tokio::test]
async fn test_query_segmented_reads_continuation_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/ops1hadoopservicelog/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-grid-continuation-next-partition-key", "p-2")
                .insert_header("x-grid-continuation-next-row-key", "r-0")
                .set_body_json(json!({"value": [{"Message": "first"}, {"Message": "second"}]})),
        )
        .mount(&server)
        .await;

    let client = TableClient::with_endpoint(&server.uri(), "account-key").unwrap();

    let segment = client
        .query_segmented::<TestRow>("ops1hadoopservicelog", "(Timestamp gt '2026-01-01')", None)
        .await
        .unwrap();

    assert_eq!(segment.rows.len(), 2);
    assert_eq!(segment.rows[0].message, "first");
    let cursor = segment.continuation.unwrap();
    assert_eq!(cursor.next_partition_key, "p-2");
    assert_eq!(cursor.next_row_key, "r-0");
}

#[tokio::test]
async fn test_query_segment_without_headers_has_no_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/logs/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;

    let client = TableClient::with_endpoint(&server.uri(), "account-key").unwrap();

    let segment = client
        .query_segmented::<TestRow>("logs", "(TraceLevel eq 'Error')", None)
        .await
        .unwrap();
    assert!(segment.rows.is_empty());
    assert!(segment.continuation.is_none());
}

#[tokio::test]
async fn test_request_token_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/common/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "expires_in": 3600,
            "user": "ops@example.test"
        })))
        .mount(&server)
        .await;

    let auth = AuthClient::new(&server.uri(), "common", "gridctl").unwrap();
    let token = auth
        .request_token("https://management.example.test", SessionMode::Fresh)
        .await
        .unwrap();

    assert_eq!(token.token, "tok-1");
    assert_eq!(token.user.as_deref(), Some("ops@example.test"));
}

#[tokio::test]
async fn test_request_token_failure_maps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/common/token"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "busy"})))
        .mount(&server)
        .await;

    let auth = AuthClient::new(&server.uri(), "common", "gridctl").unwrap();
    let err = auth
        .request_token("https://management.example.test", SessionMode::Refresh)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_list_tables_by_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tables"))
        .and(query_param("prefix", "ops1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"tableName": "ops1hadoopservicelog"}]
        })))
        .mount(&server)
        .await;

    let client = TableClient::with_endpoint(&server.uri(), "account-key").unwrap();

    let tables = client.list_tables("ops1").await.unwrap();
    assert_eq!(tables, vec!["ops1hadoopservicelog".to_string()]);
}
