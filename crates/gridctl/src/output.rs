//! Output formatting for command results

use chrono::{DateTime, Utc};
use comfy_table::Table;
use grid_api::ClusterDetail;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{GridCtlError, Result};

/// Serialize `data` and print it in the requested format.
pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(data)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Yaml => {
            let rendered = serde_yaml::to_string(&value).map_err(|e| GridCtlError::Output {
                message: format!("YAML error: {e}"),
            })?;
            println!("{rendered}");
        }
        OutputFormat::Table => print_as_table(&value),
    }
    Ok(())
}

/// Render an arbitrary JSON value as a table: arrays of objects become one
/// row per element, single objects become key/value pairs.
fn print_as_table(value: &Value) {
    match value {
        Value::Array(items) if !items.is_empty() => {
            let mut table = Table::new();
            if let Value::Object(first) = &items[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);
                for item in items {
                    if let Value::Object(fields) = item {
                        table.add_row(
                            headers
                                .iter()
                                .map(|h| cell_text(fields.get(h).unwrap_or(&Value::Null)))
                                .collect::<Vec<_>>(),
                        );
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in items {
                    table.add_row(vec![cell_text(item)]);
                }
            }
            println!("{table}");
        }
        Value::Object(fields) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);
            for (key, value) in fields {
                table.add_row(vec![key.clone(), cell_text(value)]);
            }
            println!("{table}");
        }
        other => println!("{}", cell_text(other)),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
    }
}

/// Flat per-cluster row used by `list` in table mode
#[derive(Debug, Serialize)]
pub struct ClusterRow {
    pub name: String,
    pub state: String,
    pub provisioning: String,
    pub location: String,
    pub size: String,
    pub created: String,
}

impl From<&ClusterDetail> for ClusterRow {
    fn from(cluster: &ClusterDetail) -> Self {
        Self {
            name: cluster.name.clone(),
            state: cluster.human_state(),
            provisioning: format!("{:?}", cluster.properties.provisioning_state),
            location: cluster.location.clone().unwrap_or_else(|| "-".to_string()),
            size: cluster
                .properties
                .size_in_nodes
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            created: cluster
                .properties
                .created_at
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print the connectivity endpoints of a running cluster
pub fn print_endpoints(cluster: &ClusterDetail) {
    if cluster.properties.connectivity_endpoints.is_empty() {
        return;
    }
    println!("Connectivity endpoints:");
    for endpoint in &cluster.properties.connectivity_endpoints {
        println!(
            "  {}: {}://{}:{}",
            endpoint.name,
            endpoint.protocol.as_deref().unwrap_or("https"),
            endpoint.location.as_deref().unwrap_or("-"),
            endpoint.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
}
