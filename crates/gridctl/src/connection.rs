//! Session management: profile resolution, token acquisition, client setup
//!
//! One `Session` is built per invocation and threaded explicitly into every
//! command handler; nothing about the connection lives in statics. Resolution
//! order for every knob is CLI flag > environment variable > profile value >
//! built-in default.

use gridctl_core::config::{Config, Profile};
use gridctl_core::{PollConfig, acquire_token};
use grid_api::clusters::ClusterHandler;
use grid_api::{AuthClient, GridClient};
use tracing::{debug, info};

use crate::cli::WatchArgs;
use crate::error::{GridCtlError, Result};

/// User agent string for gridctl HTTP requests
const GRIDCTL_USER_AGENT: &str = concat!("gridctl/", env!("CARGO_PKG_VERSION"));

const DEFAULT_AUTHORITY_URL: &str = "https://login.gridplatform.io";
const DEFAULT_TENANT_ID: &str = "common";
const DEFAULT_CLIENT_ID: &str = "gridctl";

/// Per-invocation session, owning the resolved profile
pub struct Session {
    config: Config,
    profile_name: Option<String>,
    resource_group_flag: Option<String>,
}

impl Session {
    pub fn new(config: Config, profile_name: Option<String>, resource_group: Option<String>) -> Self {
        Self {
            config,
            profile_name,
            resource_group_flag: resource_group,
        }
    }

    /// The active profile
    pub fn profile(&self) -> Result<&Profile> {
        let (name, profile) = self
            .config
            .resolve_profile(self.profile_name.as_deref())
            .map_err(GridCtlError::from)?;
        debug!(profile = name, "resolved profile");
        Ok(profile)
    }

    /// Resource group for cluster operations: flag > env (via flag's clap env
    /// fallback) > profile
    pub fn resource_group(&self) -> Result<String> {
        if let Some(rg) = &self.resource_group_flag {
            return Ok(rg.clone());
        }
        self.profile()?
            .resource_group
            .clone()
            .ok_or_else(|| GridCtlError::InvalidInput {
                message: "no resource group: pass --resource-group or set one in the profile"
                    .to_string(),
            })
    }

    /// Polling configuration: flags > profile > defaults
    pub fn poll_config(&self, watch: &WatchArgs) -> Result<PollConfig> {
        let mut poll = self.profile()?.poll.to_poll_config();
        if let Some(secs) = watch.poll_interval {
            poll.interval = std::time::Duration::from_secs(secs);
        }
        if let Some(mins) = watch.timeout {
            poll.timeout = std::time::Duration::from_secs(mins * 60);
        }
        Ok(poll)
    }

    /// Cleanup-on-error policy: flag wins, profile otherwise
    pub fn cleanup_on_error(&self, flag: bool) -> bool {
        flag || self
            .profile()
            .ok()
            .and_then(|p| p.poll.cleanup_on_error)
            .unwrap_or(false)
    }

    /// Build an authenticated cluster handler.
    ///
    /// Token resolution: `GRIDCTL_TOKEN` short-circuits acquisition entirely;
    /// otherwise the identity endpoint is retried without bound, switching to
    /// a refreshed session after the first failure.
    pub async fn cluster_handler(&self) -> Result<ClusterHandler> {
        let profile = self.profile()?;
        let poll = profile.poll.to_poll_config();

        let subscription_id = std::env::var("GRIDCTL_SUBSCRIPTION_ID")
            .ok()
            .unwrap_or_else(|| profile.subscription_id.clone());
        let api_url = std::env::var("GRIDCTL_API_URL")
            .ok()
            .or_else(|| profile.api_url.clone());

        let token = match std::env::var("GRIDCTL_TOKEN") {
            Ok(token) => {
                info!("using token from GRIDCTL_TOKEN");
                token
            }
            Err(_) => self.acquire_token_with_retry(profile, api_url.as_deref(), &poll).await?,
        };

        let mut builder = GridClient::builder()
            .subscription_id(&subscription_id)
            .token(token)
            .user_agent(GRIDCTL_USER_AGENT);
        if let Some(url) = &api_url {
            builder = builder.base_url(url);
        }
        let client = builder.build()?;

        info!(subscription = %subscription_id, "connected to control plane");
        Ok(ClusterHandler::new(client))
    }

    async fn acquire_token_with_retry(
        &self,
        profile: &Profile,
        api_url: Option<&str>,
        poll: &PollConfig,
    ) -> Result<String> {
        let authority = std::env::var("GRIDCTL_AUTHORITY_URL")
            .ok()
            .or_else(|| profile.authority_url.clone())
            .unwrap_or_else(|| DEFAULT_AUTHORITY_URL.to_string());
        let tenant_id = std::env::var("GRIDCTL_TENANT_ID")
            .ok()
            .or_else(|| profile.tenant_id.clone())
            .unwrap_or_else(|| DEFAULT_TENANT_ID.to_string());
        let client_id = std::env::var("GRIDCTL_CLIENT_ID")
            .ok()
            .or_else(|| profile.client_id.clone())
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());

        info!(%authority, %tenant_id, "acquiring token");
        let auth = AuthClient::new(&authority, &tenant_id, &client_id)?;
        let resource = api_url.unwrap_or("https://management.gridplatform.io").to_string();

        let auth_ref = &auth;
        let resource_ref = resource.as_str();
        let token = acquire_token(
            move |mode| auth_ref.request_token(resource_ref, mode),
            poll.interval,
        )
        .await;
        info!(
            user = token.user.as_deref().unwrap_or("<unknown>"),
            expires_on = %token.expires_on,
            "token acquired"
        );
        Ok(token.token)
    }
}
