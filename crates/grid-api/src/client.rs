//! Authenticated client for the Grid control plane
//!
//! One `GridClient` is built per CLI invocation and shared by every handler.
//! It is cheap to clone (the underlying `reqwest::Client` is an Arc) but is
//! never used by two in-flight polls at once.

use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, Result};

const DEFAULT_BASE_URL: &str = "https://management.gridplatform.io";

/// Client for the Grid control plane REST API
#[derive(Debug, Clone)]
pub struct GridClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) subscription_id: String,
    token: String,
}

impl GridClient {
    /// Start building a client
    pub fn builder() -> GridClientBuilder {
        GridClientBuilder::default()
    }

    /// Subscription this client operates on
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid endpoint path {path}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::trace!(%url, "GET");
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::trace!(%url, "PUT");
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::trace!(%url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST without a response body we care about
    pub(crate) async fn post_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::trace!(%url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::trace!(%url, "DELETE");
        let response = self.http.delete(url).bearer_auth(&self.token).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{e} (body: {body})")))
    }

    async fn check(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(())
    }
}

/// Builder for [`GridClient`]
#[derive(Debug, Default)]
pub struct GridClientBuilder {
    base_url: Option<String>,
    subscription_id: Option<String>,
    token: Option<String>,
    user_agent: Option<String>,
}

impl GridClientBuilder {
    /// Base URL of the control plane (defaults to the public endpoint)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Subscription the client operates on (required)
    pub fn subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Bearer token obtained from the identity endpoint (required)
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// User agent header for all requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<GridClient> {
        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        // A trailing slash matters for Url::join
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid base url {base_url}: {e}")))?;

        let subscription_id = self
            .subscription_id
            .ok_or_else(|| ApiError::InvalidResponse("subscription id is required".into()))?;
        let token = self
            .token
            .ok_or_else(|| ApiError::InvalidResponse("bearer token is required".into()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let mut http = reqwest::Client::builder().default_headers(headers);
        if let Some(ua) = self.user_agent {
            http = http.user_agent(ua);
        }
        let http = http.build()?;

        Ok(GridClient {
            http,
            base_url,
            subscription_id,
            token,
        })
    }
}
