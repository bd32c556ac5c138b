//! # gridctl-core
//!
//! Shared engine for the Grid CLI tools: the generic bounded poller, the
//! cluster lifecycle observer built on it, the capped paging guard for
//! segmented log queries, resilient token acquisition, and profile
//! configuration.
//!
//! Every waiting loop in the workspace goes through [`poll::poll`]. The
//! provider's asynchronous operations (create/delete) never block until
//! completion, so the caller re-queries at a fixed interval, classifies each
//! observation, and stops deterministically on a terminal state, a timeout,
//! or a resource cap. The components here exist so that interval/timeout
//! discipline is written once instead of per call site.

pub mod auth;
pub mod config;
pub mod error;
pub mod observer;
pub mod poll;
pub mod retrieval;
pub mod workflows;

pub use auth::acquire_token;
pub use config::{Config, Profile};
pub use error::{CoreError, Result};
pub use observer::{OperationHandle, OperationKind, ProgressCallback, ProgressEvent};
pub use poll::{Observation, PollConfig, PollResult, Verdict};
pub use retrieval::{FetchCaps, Fetched, Page};
