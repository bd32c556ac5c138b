//! Remote access commands

use chrono::{Duration, Utc};
use grid_api::clusters::RemoteAccessRequest;
use tracing::info;

use crate::connection::Session;
use crate::error::Result;

pub async fn enable(
    session: &Session,
    name: &str,
    access_username: &str,
    access_password: &str,
    expires_in_days: i64,
) -> Result<()> {
    let resource_group = session.resource_group()?;
    let handler = session.cluster_handler().await?;

    let expires_at = Utc::now() + Duration::days(expires_in_days);
    info!(cluster = name, %expires_at, "enabling remote access");
    handler
        .enable_remote_access(
            &resource_group,
            name,
            &RemoteAccessRequest {
                username: access_username.to_string(),
                password: access_password.to_string(),
                expires_at,
            },
        )
        .await?;

    // Write a small connection artifact so operators do not have to dig the
    // gateway host out of the portal
    let cluster = handler.get(&resource_group, name).await?;
    let host = cluster
        .properties
        .connectivity_endpoints
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case("gateway"))
        .and_then(|e| e.location.clone())
        .unwrap_or_else(|| format!("{name}.gridplatform.io"));

    let artifact_path = format!("{name}.access");
    std::fs::write(
        &artifact_path,
        format!(
            "host={host}\nusername={access_username}\nexpires={}\n",
            expires_at.format("%Y-%m-%dT%H:%M:%SZ")
        ),
    )?;

    println!("Remote access enabled for {name} until {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Connection details written to {artifact_path}");
    Ok(())
}

pub async fn disable(session: &Session, name: &str) -> Result<()> {
    let resource_group = session.resource_group()?;
    let handler = session.cluster_handler().await?;

    info!(cluster = name, "disabling remote access");
    handler.disable_remote_access(&resource_group, name).await?;
    println!("Remote access disabled for {name}");
    Ok(())
}
