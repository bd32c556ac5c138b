//! Cluster lifecycle commands: list, create, delete, resize, monitor

use grid_api::clusters::{
    CreateClusterProperties, CreateClusterRequest, LoginProfile, OsType, SshProfile,
    StorageAccountSpec,
};
use gridctl_core::workflows::{
    self, CreateOutcome, DeleteOutcome, create_cluster, delete_cluster,
};
use tracing::{info, warn};

use crate::cli::{OutputFormat, WatchArgs};
use crate::connection::Session;
use crate::error::{GridCtlError, Result};
use crate::output::{ClusterRow, print_endpoints, print_output};

use super::watch_spinner;

pub async fn list(session: &Session, output: OutputFormat) -> Result<()> {
    let handler = session.cluster_handler().await?;
    let clusters = handler.list().await?;
    info!(count = clusters.len(), "fetched cluster list");

    match output {
        OutputFormat::Table => {
            let rows: Vec<ClusterRow> = clusters.iter().map(ClusterRow::from).collect();
            print_output(rows, output)?;
        }
        _ => print_output(&clusters, output)?,
    }
    Ok(())
}

pub async fn list_one(session: &Session, name: &str, output: OutputFormat) -> Result<()> {
    let resource_group = session.resource_group()?;
    let handler = session.cluster_handler().await?;
    let cluster = handler.get(&resource_group, name).await?;

    match output {
        OutputFormat::Table => {
            print_output(ClusterRow::from(&cluster), output)?;
            print_endpoints(&cluster);
        }
        _ => print_output(&cluster, output)?,
    }
    Ok(())
}

/// Flags for `create`, resolved against profile defaults
#[derive(Debug)]
pub struct CreateParams {
    pub name: String,
    pub location: Option<String>,
    pub version: Option<String>,
    pub kind: Option<String>,
    pub os_type: Option<String>,
    pub size: Option<u32>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssh_username: Option<String>,
    pub ssh_public_key: Option<String>,
    pub storage_accounts: Vec<String>,
    pub cleanup_on_error: bool,
}

pub async fn create(
    session: &Session,
    params: CreateParams,
    watch: &WatchArgs,
    output: OutputFormat,
) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let cleanup_on_error = session.cleanup_on_error(params.cleanup_on_error);
    let request = build_create_request(session, &params)?;

    let handler = session.cluster_handler().await?;
    handler
        .ensure_resource_group(&resource_group, &request.location)
        .await?;

    info!(
        cluster = %params.name,
        resource_group = %resource_group,
        location = %request.location,
        size = request.properties.size_in_nodes,
        cleanup_on_error,
        "submitting cluster create"
    );

    let (spinner, callback) = watch_spinner();
    let outcome = create_cluster(
        &handler,
        &resource_group,
        &params.name,
        &request,
        &poll,
        cleanup_on_error,
        Some(&callback),
    )
    .await;
    if outcome.is_err() {
        spinner.finish_and_clear();
    }

    match outcome? {
        CreateOutcome::Created(cluster) => {
            println!("Cluster {} created successfully and is ready to use", cluster.name);
            match output {
                OutputFormat::Table => print_endpoints(&cluster),
                _ => print_output(&cluster, output)?,
            }
            Ok(())
        }
        CreateOutcome::CleanedUp { reason } => {
            println!(
                "Cluster {} creation failed ({reason}); the cluster was deleted by the \
                 cleanup-on-error policy",
                params.name
            );
            Ok(())
        }
        CreateOutcome::Submitted { .. } => {
            println!("Create request for {} submitted; monitoring is disabled", params.name);
            println!("To resume watching, run: gridctl monitor-create {}", params.name);
            Ok(())
        }
    }
}

pub async fn delete(
    session: &Session,
    name: &str,
    watch: &WatchArgs,
    _output: OutputFormat,
) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let handler = session.cluster_handler().await?;

    let (spinner, callback) = watch_spinner();
    let outcome = delete_cluster(&handler, &resource_group, name, &poll, Some(&callback)).await;
    if outcome.is_err() {
        spinner.finish_and_clear();
    }

    match outcome? {
        DeleteOutcome::Deleted => {
            println!("Cluster {name} deleted");
            Ok(())
        }
        DeleteOutcome::Submitted { .. } => {
            println!("Delete request for {name} submitted; monitoring is disabled");
            println!("To resume watching, run: gridctl monitor-delete {name}");
            Ok(())
        }
    }
}

/// Resize is synchronous on the provider side: snapshot, resize, snapshot.
pub async fn resize(session: &Session, name: &str, size: u32, output: OutputFormat) -> Result<()> {
    let resource_group = session.resource_group()?;
    let handler = session.cluster_handler().await?;

    let before = handler.get(&resource_group, name).await?;
    info!(
        cluster = name,
        current_size = ?before.properties.size_in_nodes,
        new_size = size,
        "resizing cluster"
    );
    if matches!(output, OutputFormat::Table) {
        print_output(ClusterRow::from(&before), output)?;
    }

    let after = handler.resize(&resource_group, name, size).await?;
    println!("Resize complete");
    match output {
        OutputFormat::Table => print_output(ClusterRow::from(&after), output)?,
        _ => print_output(&after, output)?,
    }
    Ok(())
}

pub async fn monitor_create(
    session: &Session,
    name: &str,
    watch: &WatchArgs,
    output: OutputFormat,
) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let handler = session.cluster_handler().await?;

    let (spinner, callback) = watch_spinner();
    let outcome =
        workflows::monitor_create(&handler, &resource_group, name, &poll, Some(&callback)).await;
    if outcome.is_err() {
        spinner.finish_and_clear();
    }

    match outcome? {
        CreateOutcome::Created(cluster) => {
            println!("Cluster {} is running", cluster.name);
            match output {
                OutputFormat::Table => print_endpoints(&cluster),
                _ => print_output(&cluster, output)?,
            }
            Ok(())
        }
        CreateOutcome::Submitted { last_observed } => {
            let state = last_observed
                .map(|c| c.human_state())
                .unwrap_or_else(|| "NotFound".to_string());
            println!("Cluster {name} is still provisioning (state: {state})");
            Ok(())
        }
        // monitor-create never runs the cleanup policy
        CreateOutcome::CleanedUp { reason } => {
            println!("Cluster {name} create failed and was cleaned up: {reason}");
            Ok(())
        }
    }
}

pub async fn monitor_delete(session: &Session, name: &str, watch: &WatchArgs) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let handler = session.cluster_handler().await?;

    let (spinner, callback) = watch_spinner();
    let outcome =
        workflows::monitor_delete(&handler, &resource_group, name, &poll, Some(&callback)).await;
    if outcome.is_err() {
        spinner.finish_and_clear();
    }

    match outcome? {
        DeleteOutcome::Deleted => {
            println!("Cluster {name} deleted");
            Ok(())
        }
        DeleteOutcome::Submitted { last_observed } => {
            let state = last_observed
                .map(|c| c.human_state())
                .unwrap_or_else(|| "NotFound".to_string());
            println!("Cluster {name} is still deleting (state: {state})");
            Ok(())
        }
    }
}

fn build_create_request(session: &Session, params: &CreateParams) -> Result<CreateClusterRequest> {
    let defaults = session.profile()?.cluster.clone();

    let location = params
        .location
        .clone()
        .or(defaults.location)
        .ok_or_else(|| GridCtlError::InvalidInput {
            message: "no location: pass --location or set one in the profile".to_string(),
        })?;
    let username = params
        .username
        .clone()
        .or(defaults.username)
        .unwrap_or_else(|| "admin".to_string());
    let password = params
        .password
        .clone()
        .or(defaults.password)
        .ok_or_else(|| GridCtlError::InvalidInput {
            message: "no gateway password: pass --password or set one in the profile".to_string(),
        })?;

    let os_type = parse_os_type(
        params
            .os_type
            .clone()
            .or(defaults.os_type)
            .unwrap_or_else(|| "linux".to_string()),
    )?;

    let ssh = match os_type {
        OsType::Linux => {
            let ssh_username = params
                .ssh_username
                .clone()
                .or(defaults.ssh_username)
                .unwrap_or_else(|| "sshuser".to_string());
            let key_path = params.ssh_public_key.clone().or(defaults.ssh_public_key_path);
            let (public_key, ssh_password) = match key_path {
                Some(path) => {
                    let key = std::fs::read_to_string(&path).map_err(|e| {
                        GridCtlError::InvalidInput {
                            message: format!("cannot read SSH public key {path}: {e}"),
                        }
                    })?;
                    (Some(key.trim().to_string()), None)
                }
                // no key file: the gateway password doubles as SSH password
                None => (None, Some(password.clone())),
            };
            Some(SshProfile {
                username: ssh_username,
                password: ssh_password,
                public_key,
            })
        }
        OsType::Windows => None,
    };

    let mut storage = Vec::new();
    for (i, spec) in params.storage_accounts.iter().enumerate() {
        let mut account = parse_storage_spec(spec)?;
        account.is_default = i == 0;
        if !account.name.contains('.') {
            warn!(
                account = %account.name,
                "storage account name does not look like a full endpoint; cluster creation \
                 may fail"
            );
        }
        storage.push(account);
    }

    Ok(CreateClusterRequest {
        location,
        properties: CreateClusterProperties {
            cluster_version: params.version.clone().or(defaults.version),
            cluster_kind: params.kind.clone().or(defaults.kind),
            os_type: Some(os_type),
            size_in_nodes: params.size.or(defaults.size_in_nodes).unwrap_or(4),
            login: LoginProfile { username, password },
            ssh,
            storage,
            network: None,
            node_sizes: None,
        },
    })
}

fn parse_os_type(raw: String) -> Result<OsType> {
    match raw.to_lowercase().as_str() {
        "linux" => Ok(OsType::Linux),
        "windows" => Ok(OsType::Windows),
        other => Err(GridCtlError::InvalidInput {
            message: format!("invalid os type '{other}' (valid: linux, windows)"),
        }),
    }
}

/// Parse `NAME=KEY[:CONTAINER]`
fn parse_storage_spec(spec: &str) -> Result<StorageAccountSpec> {
    let (name, rest) = spec.split_once('=').ok_or_else(|| GridCtlError::InvalidInput {
        message: format!("invalid storage account '{spec}' (expected NAME=KEY[:CONTAINER])"),
    })?;
    let (key, container) = match rest.split_once(':') {
        Some((key, container)) => (key, Some(container.to_string())),
        None => (rest, None),
    };
    if name.is_empty() || key.is_empty() {
        return Err(GridCtlError::InvalidInput {
            message: format!("invalid storage account '{spec}' (expected NAME=KEY[:CONTAINER])"),
        });
    }
    Ok(StorageAccountSpec {
        name: name.to_string(),
        key: key.to_string(),
        container,
        is_default: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_os_type_is_case_insensitive() {
        assert_eq!(parse_os_type("Linux".into()).unwrap(), OsType::Linux);
        assert_eq!(parse_os_type("WINDOWS".into()).unwrap(), OsType::Windows);
        assert!(parse_os_type("beos".into()).is_err());
    }

    #[test]
    fn test_parse_storage_spec_full_form() {
        let account = parse_storage_spec("logs.blob.gridplatform.io=c2VjcmV0:cluster-logs").unwrap();
        assert_eq!(account.name, "logs.blob.gridplatform.io");
        assert_eq!(account.key, "c2VjcmV0");
        assert_eq!(account.container.as_deref(), Some("cluster-logs"));
    }

    #[test]
    fn test_parse_storage_spec_without_container() {
        let account = parse_storage_spec("logs=key").unwrap();
        assert!(account.container.is_none());
    }

    #[test]
    fn test_parse_storage_spec_rejects_malformed_input() {
        assert!(parse_storage_spec("just-a-name").is_err());
        assert!(parse_storage_spec("=key").is_err());
        assert!(parse_storage_spec("name=").is_err());
    }
}
