//! CSV report writer

use std::path::Path;

use anyhow::{Context, Result};

use crate::entity::{OsFlavor, ServiceLogRecord};

/// Write `records` to `path`, one row per record, in arrival order.
pub fn write_report(path: &Path, flavor: OsFlavor, records: &[ServiceLogRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create report {}", path.display()))?;

    let instance_column = match flavor {
        OsFlavor::Linux => "Host",
        OsFlavor::Windows => "RoleInstance",
    };
    writer.write_record([
        "Timestamp",
        "Role",
        instance_column,
        "TraceLevel",
        "ComponentName",
        "Message",
        "PartitionKey",
        "RowKey",
    ])?;

    for record in records {
        writer.write_record([
            record
                .timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default()
                .as_str(),
            record.role.as_deref().unwrap_or(""),
            record.instance(flavor).unwrap_or(""),
            record.trace_level.as_deref().unwrap_or(""),
            record.component_name.as_deref().unwrap_or(""),
            record.message.as_deref().unwrap_or(""),
            record.partition_key.as_str(),
            record.row_key.as_str(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("cannot write report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(message: &str) -> ServiceLogRecord {
        ServiceLogRecord {
            partition_key: "p-1".into(),
            row_key: "r-1".into(),
            timestamp: Some(Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap()),
            tenant: None,
            role: Some("workernode".into()),
            trace_level: Some("Error".into()),
            component_name: Some("datanode".into()),
            message: Some(message.into()),
            host: Some("wn3".into()),
            role_instance: None,
        }
    }

    #[test]
    fn test_linux_report_uses_host_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");

        write_report(&path, OsFlavor::Linux, &[record("disk failure")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().contains("Host"));
        let row = lines.next().unwrap();
        assert!(row.contains("wn3"));
        assert!(row.contains("disk failure"));
    }

    #[test]
    fn test_windows_report_uses_role_instance_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");

        write_report(&path, OsFlavor::Windows, &[record("x")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().next().unwrap().contains("RoleInstance"));
    }

    #[test]
    fn test_messages_with_commas_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");

        write_report(&path, OsFlavor::Linux, &[record("a, b, \"c\"")]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[5], "a, b, \"c\"");
    }
}
