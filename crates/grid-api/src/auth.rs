//! Token acquisition against the platform identity endpoint
//!
//! One call, one token. Retry policy lives with the caller
//! (`gridctl_core::auth`), not here.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::{ApiError, Result};

/// How the identity endpoint should treat the session on this attempt.
///
/// `Fresh` lets the endpoint reuse whatever session state it has; `Refresh`
/// asks it to discard that state and re-establish the session. Callers switch
/// to `Refresh` after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Fresh,
    Refresh,
}

impl SessionMode {
    fn as_param(self) -> &'static str {
        match self {
            SessionMode::Fresh => "auto",
            SessionMode::Refresh => "refresh_session",
        }
    }
}

/// A bearer token for the control plane
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: Option<String>,
}

/// Client for the identity endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    authority: Url,
    tenant_id: String,
    client_id: String,
}

impl AuthClient {
    pub fn new(authority: &str, tenant_id: &str, client_id: &str) -> Result<Self> {
        let normalized = if authority.ends_with('/') {
            authority.to_string()
        } else {
            format!("{authority}/")
        };
        let authority = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid authority url: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            authority,
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
        })
    }

    /// Request a token scoped to `resource`.
    ///
    /// Fails with an `ApiError` on any transport or endpoint problem; never
    /// retries on its own.
    pub async fn request_token(&self, resource: &str, mode: SessionMode) -> Result<AccessToken> {
        let url = self
            .authority
            .join(&format!("{}/token", self.tenant_id))
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        tracing::debug!(%url, ?mode, "requesting token");
        let response = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("resource", resource),
                ("prompt", mode.as_param()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{e} (body: {body})")))?;
        Ok(AccessToken {
            token: parsed.access_token,
            expires_on: Utc::now() + Duration::seconds(parsed.expires_in),
            user: parsed.user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_mode_params() {
        assert_eq!(SessionMode::Fresh.as_param(), "auto");
        assert_eq!(SessionMode::Refresh.as_param(), "refresh_session");
    }

    #[test]
    fn test_token_response_shape() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","expires_in":3600,"user":"ops@example.test"}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 3600);
        assert_eq!(parsed.user.as_deref(), Some("ops@example.test"));
    }
}
