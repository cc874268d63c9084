//! Tag Manager resource-tree client.
//!
//! Navigates accounts, containers, workspaces and their tags, triggers,
//! variables and folders through a [`Gateway`], and runs the bulk workspace
//! operations on top of them.
//!
//! # Architecture
//!
//! - **Gateway**: executes one remote call at a time ([`HttpGateway`] talks to
//!   the Tag Manager API with OAuth2 bearer tokens, a client-side rate limit
//!   and backoff on transient failures)
//! - **Entities**: [`Entity`] binds a `gtm_model::Resource` to its gateway;
//!   [`Account`], [`Container`] and [`Workspace`] add cached child listings
//! - **Versions**: [`Version`] holds a full container snapshot, either stored
//!   or compiled from a workspace as a quick preview
//!
//! # Example
//!
//! ```no_run
//! use gtm_client::{CredentialsFile, GatewayConfig, Manager};
//!
//! # async fn run() -> gtm_client::GtmResult<()> {
//! let credentials = CredentialsFile::from_file("credentials.json")?;
//! let manager = Manager::with_credentials(GatewayConfig::default(), credentials)?;
//!
//! let mut workspace = manager
//!     .workspace("accounts/1/containers/2/workspaces/3")
//!     .await?;
//! let triggers = workspace.trigger_map(false).await?;
//! println!("{} trigger names and ids", triggers.len());
//! # Ok(())
//! # }
//! ```

mod account;
mod config;
mod container;
mod entity;
mod error;
pub mod gateway;
mod manager;
mod sync;
mod version;
mod workspace;

pub use account::{Account, ContainerSpec};
pub use config::{CredentialsFile, GatewayConfig, RateLimitConfig, RetryConfig};
pub use container::{Container, LiveVersion};
pub use entity::{
    BuiltInVariable, Entity, Folder, Permission, Tag, Trigger, Variable, VersionHeader,
};
pub use error::{GtmError, GtmResult};
pub use gateway::{Gateway, GatewayCall, HttpGateway, Operation};
pub use manager::Manager;
pub use sync::{ConflictEntity, MergeConflict, SyncOutcome, SyncStatus, WorkspaceStatus};
pub use version::{PublishOutcome, Version};
pub use workspace::{ClearReport, Workspace, MAX_VARIABLE_DELETE_ROUNDS};

pub use gtm_model;
