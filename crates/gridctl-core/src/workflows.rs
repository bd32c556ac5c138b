//! Cluster lifecycle workflows - submit plus observe
//!
//! These compose the API handlers with the observer and turn terminal
//! verdicts into either outcomes or errors. Classified failures only become
//! `CoreError` here, at the workflow boundary, so that policy like
//! cleanup-on-error can still react to them programmatically.

use chrono::{DateTime, Utc};
use grid_api::ClusterDetail;
use grid_api::clusters::{ClusterHandler, CreateClusterRequest};

use crate::error::{CoreError, Result};
use crate::observer::{OperationHandle, OperationKind, ProgressCallback, classify_snapshot, watch};
use crate::poll::{PollConfig, Verdict};

/// How a create command ended
#[derive(Debug)]
pub enum CreateOutcome {
    /// The cluster reached its running state; snapshot attached for
    /// post-create side effects (endpoint printout, access artifacts)
    Created(ClusterDetail),
    /// The create failed but cleanup-on-error deleted the resource again
    CleanedUp { reason: String },
    /// Monitoring was disabled (zero timeout); the request was submitted and
    /// the first check returned a non-terminal state
    Submitted { last_observed: Option<ClusterDetail> },
}

/// How a delete command ended
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The resource can no longer be fetched
    Deleted,
    /// Monitoring was disabled (zero timeout); the request was submitted and
    /// the resource was still present on the first check
    Submitted { last_observed: Option<ClusterDetail> },
}

/// Create a cluster and observe it to a terminal state.
///
/// With `cleanup_on_error` set, a `Failed` or `TimedOut` verdict triggers an
/// automatic delete of the same resource, observed to completion with the
/// same config, instead of surfacing the create failure as fatal.
pub async fn create_cluster(
    clusters: &ClusterHandler,
    resource_group: &str,
    name: &str,
    request: &CreateClusterRequest,
    config: &PollConfig,
    cleanup_on_error: bool,
    on_progress: Option<&ProgressCallback>,
) -> Result<CreateOutcome> {
    let accepted = clusters.create(resource_group, name, request).await?;
    tracing::info!(
        cluster = name,
        operation_id = accepted.operation_id.as_deref().unwrap_or("<none>"),
        status = accepted.status.as_deref().unwrap_or("<none>"),
        "create request submitted"
    );

    // Give the provider one interval to materialize the resource before the
    // first probe
    tokio::time::sleep(config.interval).await;

    let result = watch(
        clusters,
        &OperationHandle::new(name, resource_group, OperationKind::Create),
        config,
        on_progress,
    )
    .await?;

    if cleanup_on_error && matches!(result.verdict, Verdict::Failed(_) | Verdict::TimedOut) {
        let reason = verdict_reason(&result.verdict, config);
        log_last_observed(name, result.last_observed.as_ref());
        tracing::warn!(
            cluster = name,
            reason = %reason,
            "create unsuccessful, cleanup-on-error is submitting a delete"
        );
        delete_cluster(clusters, resource_group, name, config, on_progress).await?;
        return Ok(CreateOutcome::CleanedUp { reason });
    }

    finish_create(name, result.verdict, result.last_observed, config)
}

/// Resume observing a create already in flight (no submission).
pub async fn monitor_create(
    clusters: &ClusterHandler,
    resource_group: &str,
    name: &str,
    config: &PollConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<CreateOutcome> {
    let result = watch(
        clusters,
        &OperationHandle::new(name, resource_group, OperationKind::Create),
        config,
        on_progress,
    )
    .await?;
    finish_create(name, result.verdict, result.last_observed, config)
}

fn finish_create(
    name: &str,
    verdict: Verdict,
    last_observed: Option<ClusterDetail>,
    config: &PollConfig,
) -> Result<CreateOutcome> {
    match verdict {
        Verdict::Succeeded => match last_observed {
            Some(cluster) => Ok(CreateOutcome::Created(cluster)),
            None => Err(CoreError::OperationFailed {
                name: name.to_string(),
                reason: "create succeeded but no snapshot was observed".to_string(),
            }),
        },
        Verdict::Pending => Ok(CreateOutcome::Submitted { last_observed }),
        verdict => {
            log_last_observed(name, last_observed.as_ref());
            Err(classified_failure(name, &verdict, config))
        }
    }
}

/// Delete a cluster and observe it until it can no longer be fetched.
pub async fn delete_cluster(
    clusters: &ClusterHandler,
    resource_group: &str,
    name: &str,
    config: &PollConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<DeleteOutcome> {
    let accepted = clusters.delete(resource_group, name).await?;
    tracing::info!(
        cluster = name,
        operation_id = accepted.operation_id.as_deref().unwrap_or("<none>"),
        status = accepted.status.as_deref().unwrap_or("<none>"),
        "delete request submitted"
    );

    monitor_delete(clusters, resource_group, name, config, on_progress).await
}

/// Resume observing a delete already in flight (no submission).
pub async fn monitor_delete(
    clusters: &ClusterHandler,
    resource_group: &str,
    name: &str,
    config: &PollConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<DeleteOutcome> {
    let result = watch(
        clusters,
        &OperationHandle::new(name, resource_group, OperationKind::Delete),
        config,
        on_progress,
    )
    .await?;

    match result.verdict {
        Verdict::NotFound => Ok(DeleteOutcome::Deleted),
        Verdict::Pending => Ok(DeleteOutcome::Submitted {
            last_observed: result.last_observed,
        }),
        verdict => {
            log_last_observed(name, result.last_observed.as_ref());
            Err(classified_failure(name, &verdict, config))
        }
    }
}

/// True for clusters in a state the errored-cluster sweep should delete.
/// Same criteria as the create classifier's failure branch.
pub fn is_errored(cluster: &ClusterDetail) -> bool {
    matches!(classify_snapshot(cluster), Verdict::Failed(_))
}

/// True for clusters created before `cutoff`. Clusters without a creation
/// timestamp are never considered stale.
pub fn is_stale(cluster: &ClusterDetail, cutoff: DateTime<Utc>) -> bool {
    cluster
        .properties
        .created_at
        .is_some_and(|created| created < cutoff)
}

fn verdict_reason(verdict: &Verdict, config: &PollConfig) -> String {
    match verdict {
        Verdict::Failed(reason) => reason.clone(),
        Verdict::TimedOut => format!("timed out after {:?}", config.timeout),
        other => other.to_string(),
    }
}

fn classified_failure(name: &str, verdict: &Verdict, config: &PollConfig) -> CoreError {
    match verdict {
        Verdict::TimedOut => CoreError::OperationTimeout {
            name: name.to_string(),
            timeout: config.timeout,
        },
        Verdict::Failed(reason) => CoreError::OperationFailed {
            name: name.to_string(),
            reason: reason.clone(),
        },
        other => CoreError::OperationFailed {
            name: name.to_string(),
            reason: format!("unexpected terminal verdict: {other}"),
        },
    }
}

fn log_last_observed(name: &str, last_observed: Option<&ClusterDetail>) {
    match last_observed {
        Some(cluster) => tracing::error!(
            cluster = name,
            snapshot = ?cluster,
            "last observed state before terminal failure"
        ),
        None => tracing::error!(cluster = name, "no snapshot observed before terminal failure"),
    }
}
