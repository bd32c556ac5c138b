//! Cluster lifecycle observation
//!
//! Specializes the bounded poller for cluster create and delete. The two
//! status signals a snapshot carries (`provisioning_state` and the free-text
//! `cluster_state`) are not always consistent with each other, so the
//! classifier checks both.
//!
//! Create and delete disagree about what an absent resource means: during a
//! create the resource simply has not materialized yet (keep waiting), while
//! during a delete absence is the success condition. Both classifiers treat
//! a 404 probe error and an empty fetch identically.

use std::time::Duration;

use grid_api::clusters::ClusterHandler;
use grid_api::{ClusterDetail, ProvisioningState};

use crate::error::Result;
use crate::poll::{Observation, PollConfig, PollResult, Verdict, poll};

/// Which lifecycle transition is being observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Identifies one external resource under observation
#[derive(Debug, Clone)]
pub struct OperationHandle {
    pub name: String,
    pub resource_group: String,
    pub kind: OperationKind,
}

impl OperationHandle {
    pub fn new(name: impl Into<String>, resource_group: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            kind,
        }
    }
}

/// Progress events emitted while observing an operation
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Observation has started
    Started { name: String, kind: OperationKind },
    /// One poll tick with the latest human state
    Tick {
        name: String,
        state: String,
        elapsed: Duration,
    },
    /// The operation reached its success condition
    Completed { name: String, kind: OperationKind },
    /// The operation failed or timed out
    Failed {
        name: String,
        kind: OperationKind,
        reason: String,
    },
}

/// Callback type for progress updates. The CLI hangs a spinner off this;
/// headless callers pass `None`.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

/// Classify one snapshot of a cluster that is being created.
///
/// Pure function of the snapshot; elapsed time never changes the answer.
pub fn classify_snapshot(cluster: &ClusterDetail) -> Verdict {
    let human = cluster.properties.cluster_state.as_deref().unwrap_or("");
    if matches!(
        cluster.properties.provisioning_state,
        ProvisioningState::Failed | ProvisioningState::Canceled
    ) || human.eq_ignore_ascii_case("error")
        || human.eq_ignore_ascii_case("unknown")
    {
        return Verdict::Failed(format!(
            "provisioning state {:?}, cluster state '{human}'",
            cluster.properties.provisioning_state
        ));
    }
    if cluster.properties.provisioning_state == ProvisioningState::Succeeded
        || human.eq_ignore_ascii_case("running")
    {
        return Verdict::Succeeded;
    }
    Verdict::Pending
}

/// Classifier for the create path: absence means the resource has not shown
/// up yet.
pub fn classify_create(observation: &Observation<ClusterDetail>, _elapsed: Duration) -> Verdict {
    match observation {
        Observation::Present(cluster) => classify_snapshot(cluster),
        Observation::Absent => Verdict::Pending,
    }
}

/// Classifier for the delete path: the operation is done precisely when the
/// resource can no longer be fetched. Whatever states the cluster passes
/// through on the way down are pending, including error states.
pub fn classify_delete(observation: &Observation<ClusterDetail>, _elapsed: Duration) -> Verdict {
    match observation {
        Observation::Present(_) => Verdict::Pending,
        Observation::Absent => Verdict::NotFound,
    }
}

/// Observe `handle` until its operation reaches a terminal verdict.
///
/// Every tick is logged with the resource name, latest human state and
/// elapsed seconds, and forwarded to `on_progress` when present.
pub async fn watch(
    clusters: &ClusterHandler,
    handle: &OperationHandle,
    config: &PollConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<PollResult<ClusterDetail>> {
    emit(
        on_progress,
        ProgressEvent::Started {
            name: handle.name.clone(),
            kind: handle.kind,
        },
    );

    let classify = match handle.kind {
        OperationKind::Create => classify_create,
        OperationKind::Delete => classify_delete,
    };

    let result = poll(
        move || async move {
            clusters
                .get(&handle.resource_group, &handle.name)
                .await
                .map(Observation::Present)
        },
        classify,
        config,
        |observation, elapsed| {
            let state = match observation {
                Observation::Present(cluster) => cluster.human_state(),
                Observation::Absent => "NotFound".to_string(),
            };
            tracing::info!(
                cluster = %handle.name,
                state = %state,
                elapsed_secs = elapsed.as_secs(),
                "{} in progress",
                handle.kind
            );
            emit(
                on_progress,
                ProgressEvent::Tick {
                    name: handle.name.clone(),
                    state,
                    elapsed,
                },
            );
        },
    )
    .await?;

    match &result.verdict {
        Verdict::Succeeded | Verdict::NotFound => emit(
            on_progress,
            ProgressEvent::Completed {
                name: handle.name.clone(),
                kind: handle.kind,
            },
        ),
        Verdict::Failed(reason) => emit(
            on_progress,
            ProgressEvent::Failed {
                name: handle.name.clone(),
                kind: handle.kind,
                reason: reason.clone(),
            },
        ),
        Verdict::TimedOut => emit(
            on_progress,
            ProgressEvent::Failed {
                name: handle.name.clone(),
                kind: handle.kind,
                reason: "timed out".to_string(),
            },
        ),
        Verdict::Pending => {}
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_api::clusters::ClusterProperties;

    fn snapshot(provisioning: ProvisioningState, state: Option<&str>) -> ClusterDetail {
        ClusterDetail {
            id: None,
            name: "etl-prod".into(),
            location: Some("westus".into()),
            properties: ClusterProperties {
                provisioning_state: provisioning,
                cluster_state: state.map(str::to_string),
                created_at: None,
                cluster_version: None,
                cluster_kind: None,
                os_type: None,
                size_in_nodes: None,
                connectivity_endpoints: Vec::new(),
            },
        }
    }

    #[test]
    fn test_failed_provisioning_states_classify_as_failed() {
        for provisioning in [ProvisioningState::Failed, ProvisioningState::Canceled] {
            let verdict = classify_snapshot(&snapshot(provisioning, Some("Accepted")));
            assert!(matches!(verdict, Verdict::Failed(_)), "{provisioning:?}");
        }
    }

    #[test]
    fn test_error_and_unknown_human_states_classify_as_failed_case_insensitively() {
        for state in ["Error", "error", "ERROR", "Unknown", "unknown"] {
            let verdict = classify_snapshot(&snapshot(ProvisioningState::InProgress, Some(state)));
            assert!(matches!(verdict, Verdict::Failed(_)), "{state}");
        }
    }

    #[test]
    fn test_succeeded_or_running_classifies_as_succeeded() {
        assert_eq!(
            classify_snapshot(&snapshot(ProvisioningState::Succeeded, Some("Configuring"))),
            Verdict::Succeeded
        );
        assert_eq!(
            classify_snapshot(&snapshot(ProvisioningState::InProgress, Some("running"))),
            Verdict::Succeeded
        );
    }

    #[test]
    fn test_anything_else_is_pending() {
        assert_eq!(
            classify_snapshot(&snapshot(ProvisioningState::InProgress, Some("Accepted"))),
            Verdict::Pending
        );
        assert_eq!(
            classify_snapshot(&snapshot(ProvisioningState::Other, None)),
            Verdict::Pending
        );
    }

    #[test]
    fn test_create_treats_absence_as_pending() {
        assert_eq!(
            classify_create(&Observation::Absent, Duration::ZERO),
            Verdict::Pending
        );
    }

    #[test]
    fn test_delete_treats_absence_as_terminal_success() {
        assert_eq!(
            classify_delete(&Observation::Absent, Duration::ZERO),
            Verdict::NotFound
        );
    }

    #[test]
    fn test_delete_ignores_error_states_on_the_way_down() {
        let observation = Observation::Present(snapshot(ProvisioningState::Failed, Some("Error")));
        assert_eq!(classify_delete(&observation, Duration::ZERO), Verdict::Pending);
    }
}
