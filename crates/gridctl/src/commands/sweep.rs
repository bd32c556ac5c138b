//! Bulk delete sweeps: errored clusters and stale clusters

use chrono::{Duration, Utc};
use dialoguer::Confirm;
use gridctl_core::config::PollSettings;
use gridctl_core::workflows::{delete_cluster, is_errored, is_stale};
use tracing::{error, info};

use crate::cli::WatchArgs;
use crate::connection::Session;
use crate::error::Result;

use super::watch_spinner;

/// Delete every cluster whose provisioning or human state marks it errored.
pub async fn delete_errored(session: &Session, watch: &WatchArgs) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let handler = session.cluster_handler().await?;

    let clusters = handler.list().await?;
    for cluster in &clusters {
        info!(
            cluster = %cluster.name,
            state = %cluster.human_state(),
            created_at = ?cluster.properties.created_at,
            "found cluster"
        );
    }

    let errored: Vec<_> = clusters.iter().filter(|c| is_errored(c)).collect();
    println!(
        "Clusters found: {}, clusters in error/unknown state: {}",
        clusters.len(),
        errored.len()
    );

    let mut deleted = 0;
    for cluster in errored {
        let (spinner, callback) = watch_spinner();
        let outcome =
            delete_cluster(&handler, &resource_group, &cluster.name, &poll, Some(&callback)).await;
        if outcome.is_err() {
            spinner.finish_and_clear();
        }
        outcome?;
        deleted += 1;
    }

    println!("Clusters deleted: {deleted}");
    Ok(())
}

/// Delete every cluster older than the cutoff, tolerating per-cluster
/// failures.
pub async fn delete_stale(
    session: &Session,
    cutoff_hours: Option<i64>,
    yes: bool,
    watch: &WatchArgs,
) -> Result<()> {
    let resource_group = session.resource_group()?;
    let poll = session.poll_config(watch)?;
    let cutoff_hours = cutoff_hours
        .or(session.profile()?.poll.delete_cutoff_hours)
        .unwrap_or(PollSettings::DEFAULT_DELETE_CUTOFF_HOURS);

    if !yes
        && !Confirm::new()
            .with_prompt(format!(
                "Delete all clusters created more than {cutoff_hours} hours ago? This cannot \
                 be undone"
            ))
            .default(false)
            .interact()
            .unwrap_or(false)
    {
        println!("Operation aborted");
        return Ok(());
    }

    let handler = session.cluster_handler().await?;
    let clusters = handler.list().await?;

    let now = Utc::now();
    let cutoff = now - Duration::hours(cutoff_hours);
    info!(%now, %cutoff, total = clusters.len(), "searching for stale clusters");

    let stale: Vec<_> = clusters.iter().filter(|c| is_stale(c, cutoff)).collect();
    for cluster in &stale {
        println!(
            "  {} (state: {}, created: {})",
            cluster.name,
            cluster.human_state(),
            cluster
                .properties
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!("Clusters to be deleted: {}", stale.len());

    if stale.is_empty() {
        return Ok(());
    }
    if !yes
        && !Confirm::new()
            .with_prompt("Proceed?")
            .default(false)
            .interact()
            .unwrap_or(false)
    {
        println!("Operation aborted");
        return Ok(());
    }

    let mut deleted = 0;
    for cluster in stale {
        let (spinner, callback) = watch_spinner();
        let outcome =
            delete_cluster(&handler, &resource_group, &cluster.name, &poll, Some(&callback)).await;
        match outcome {
            Ok(_) => deleted += 1,
            // keep sweeping; one stuck cluster should not stop the rest
            Err(e) => {
                spinner.finish_and_clear();
                error!(cluster = %cluster.name, error = %e, "delete failed, continuing");
            }
        }
    }

    println!("Clusters deleted: {deleted}");
    Ok(())
}
