//! Cluster CRUD operations against the Grid control plane
//!
//! Create and delete are asynchronous on the provider side: the submit call
//! returns an [`OperationAccepted`] handle and the cluster must be observed
//! via `get` until it reaches a terminal state. Resize is synchronous.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GridClient;
use crate::error::Result;

/// Provider-reported provisioning state of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    Deleting,
    /// States this client does not know about yet
    #[serde(other)]
    Other,
}

/// Cluster operating system flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

/// A public endpoint exposed by a running cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityEndpoint {
    pub name: String,
    pub protocol: Option<String>,
    pub location: Option<String>,
    pub port: Option<u16>,
}

/// Provider-reported snapshot of a cluster's properties.
///
/// `provisioning_state` and `cluster_state` are two independent status
/// signals; they are not always consistent with each other and callers must
/// check both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    pub provisioning_state: ProvisioningState,
    /// Free-text human state string ("Running", "Accepted", "Error", ...)
    pub cluster_state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub cluster_version: Option<String>,
    pub cluster_kind: Option<String>,
    pub os_type: Option<OsType>,
    pub size_in_nodes: Option<u32>,
    #[serde(default)]
    pub connectivity_endpoints: Vec<ConnectivityEndpoint>,
}

/// A cluster as returned by the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetail {
    pub id: Option<String>,
    pub name: String,
    pub location: Option<String>,
    pub properties: ClusterProperties,
}

impl ClusterDetail {
    /// Human state string for logging, falling back to the provisioning state
    pub fn human_state(&self) -> String {
        self.properties
            .cluster_state
            .clone()
            .unwrap_or_else(|| format!("{:?}", self.properties.provisioning_state))
    }
}

/// Handle returned when an asynchronous operation is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationAccepted {
    pub operation_id: Option<String>,
    pub status: Option<String>,
}

/// Credentials for the cluster gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub username: String,
    pub password: String,
}

/// SSH access profile for Linux clusters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshProfile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// One storage account attached to a cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountSpec {
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Virtual network placement for a cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub virtual_network_id: String,
    pub subnet_name: String,
}

/// Per-role node sizes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSizes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterProperties {
    pub cluster_version: Option<String>,
    pub cluster_kind: Option<String>,
    pub os_type: Option<OsType>,
    pub size_in_nodes: u32,
    pub login: LoginProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<StorageAccountSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_sizes: Option<NodeSizes>,
}

/// Request body for cluster creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub location: String,
    pub properties: CreateClusterProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub target_size_in_nodes: u32,
}

/// Request body for enabling remote access on a cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccessRequest {
    pub username: String,
    pub password: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ResourceGroupRequest<'a> {
    location: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClusterListResponse {
    value: Vec<ClusterDetail>,
}

/// Handler for cluster operations
pub struct ClusterHandler {
    client: GridClient,
}

impl ClusterHandler {
    pub fn new(client: GridClient) -> Self {
        Self { client }
    }

    fn cluster_path(&self, resource_group: &str, name: &str) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/clusters/{}",
            self.client.subscription_id, resource_group, name
        )
    }

    /// List every cluster in the subscription
    pub async fn list(&self) -> Result<Vec<ClusterDetail>> {
        let path = format!("subscriptions/{}/clusters", self.client.subscription_id);
        let response: ClusterListResponse = self.client.get_json(&path).await?;
        Ok(response.value)
    }

    /// Fetch the current snapshot of one cluster. A missing cluster comes
    /// back as `ApiError::NotFound`.
    pub async fn get(&self, resource_group: &str, name: &str) -> Result<ClusterDetail> {
        self.client
            .get_json(&self.cluster_path(resource_group, name))
            .await
    }

    /// Submit a cluster create. The call returns as soon as the provider
    /// accepts the request; the cluster must then be observed to completion.
    pub async fn create(
        &self,
        resource_group: &str,
        name: &str,
        request: &CreateClusterRequest,
    ) -> Result<OperationAccepted> {
        self.client
            .put_json(&self.cluster_path(resource_group, name), request)
            .await
    }

    /// Submit a cluster delete. Same asynchronous contract as `create`.
    pub async fn delete(&self, resource_group: &str, name: &str) -> Result<OperationAccepted> {
        self.client
            .delete_json(&self.cluster_path(resource_group, name))
            .await
    }

    /// Resize a cluster. Unlike create/delete the provider treats this as a
    /// synchronous call and responds with the updated snapshot.
    pub async fn resize(
        &self,
        resource_group: &str,
        name: &str,
        target_size_in_nodes: u32,
    ) -> Result<ClusterDetail> {
        let path = format!("{}/resize", self.cluster_path(resource_group, name));
        self.client
            .post_json(&path, &ResizeRequest { target_size_in_nodes })
            .await
    }

    /// Enable remote access on a cluster's gateway nodes
    pub async fn enable_remote_access(
        &self,
        resource_group: &str,
        name: &str,
        request: &RemoteAccessRequest,
    ) -> Result<()> {
        let path = format!("{}/remoteAccess/enable", self.cluster_path(resource_group, name));
        self.client.post_empty(&path, request).await
    }

    /// Disable remote access on a cluster's gateway nodes
    pub async fn disable_remote_access(&self, resource_group: &str, name: &str) -> Result<()> {
        let path = format!("{}/remoteAccess/disable", self.cluster_path(resource_group, name));
        self.client.post_empty(&path, &serde_json::json!({})).await
    }

    /// Create the resource group if it does not exist yet. Idempotent on the
    /// provider side.
    pub async fn ensure_resource_group(&self, resource_group: &str, location: &str) -> Result<()> {
        let path = format!(
            "subscriptions/{}/resourceGroups/{}",
            self.client.subscription_id, resource_group
        );
        let _: serde_json::Value = self
            .client
            .put_json(&path, &ResourceGroupRequest { location })
            .await?;
        Ok(())
    }
}
