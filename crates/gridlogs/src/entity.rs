//! Wire shape of one diagnostic log row
//!
//! Linux clusters report the emitting node in the `Host` column, Windows
//! clusters in `RoleInstance`; one record type carries both and the report
//! writer picks the right one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cluster operating system flavor, which decides the instance column
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OsFlavor {
    Linux,
    Windows,
}

/// One row of the service log table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceLogRecord {
    pub partition_key: String,
    pub row_key: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub trace_level: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub role_instance: Option<String>,
}

impl ServiceLogRecord {
    /// The node that emitted this record, per OS flavor
    pub fn instance(&self, flavor: OsFlavor) -> Option<&str> {
        match flavor {
            OsFlavor::Linux => self.host.as_deref(),
            OsFlavor::Windows => self.role_instance.as_deref(),
        }
    }
}
