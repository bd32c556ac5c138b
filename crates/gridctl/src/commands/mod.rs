//! Command handlers

pub mod access;
pub mod cluster;
pub mod sweep;

use gridctl_core::{ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner wired to observer progress events.
///
/// The returned bar is finished by the Completed/Failed events; callers keep
/// it around to clear it on early error paths.
pub(crate) fn watch_spinner() -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::Started { name, kind } => {
            pb_clone.set_message(format!("Watching {kind} of cluster {name}"));
        }
        ProgressEvent::Tick { name, state, elapsed } => {
            pb_clone.set_message(format!(
                "Cluster {name}: {state} ({}s elapsed)",
                elapsed.as_secs()
            ));
        }
        ProgressEvent::Completed { name, kind } => {
            pb_clone.finish_with_message(format!("Cluster {name}: {kind} complete"));
        }
        ProgressEvent::Failed { name, kind, reason } => {
            pb_clone.finish_with_message(format!("Cluster {name}: {kind} failed: {reason}"));
        }
    });

    (pb, callback)
}
