//! # grid-api
//!
//! HTTP client for the Grid data platform: the control plane that hosts
//! big-data clusters, the identity endpoint that issues bearer tokens, and
//! the table storage service that holds cluster diagnostic logs.
//!
//! The crate is deliberately thin: it models request/response shapes, maps
//! HTTP statuses into [`ApiError`], and leaves every retry, poll and timeout
//! decision to the caller. Asynchronous operations (cluster create/delete)
//! return an [`clusters::OperationAccepted`] handle; observing them to
//! completion is `gridctl-core`'s job.
//!
//! ```rust,ignore
//! let client = GridClient::builder()
//!     .subscription_id("sub-1")
//!     .token(token.token)
//!     .build()?;
//! let clusters = ClusterHandler::new(client.clone());
//! let snapshot = clusters.get("ops-rg", "etl-prod").await?;
//! ```

pub mod auth;
pub mod client;
pub mod clusters;
pub mod error;
pub mod tables;

pub use auth::{AccessToken, AuthClient, SessionMode};
pub use client::GridClient;
pub use clusters::{ClusterDetail, ClusterHandler, ProvisioningState};
pub use error::{ApiError, Result};
pub use tables::{TableClient, TableCursor, TableSegment};
