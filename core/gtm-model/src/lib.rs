//! Resource model for Tag Manager clients.
//!
//! Defines the I/O-free half of the client:
//! - [`Parameter`]: one node of a tag/trigger/variable parameter tree
//! - [`merge_parameters`]: key-based, one-level merge of parameter sequences
//! - [`ResourceKind`]: static descriptor of a remote resource type
//! - [`Resource`]: a path-addressed local copy of one remote resource
//! - [`ResourceUpdate`]: overrides for a whole-object update
//!
//! The remote calls themselves live in `gtm-client`.

mod accessors;
mod error;
mod kind;
mod merge;
mod parameter;
mod resource;
mod update;

pub use accessors::ContainerAccess;
pub use error::{ModelError, ModelResult};
pub use kind::{
    AccountKind, BuiltInVariableKind, ContainerKind, FolderKind, PermissionKind, ResourceKind,
    TagKind, TriggerKind, VariableKind, VersionHeaderKind, VersionKind, WorkspaceKind,
};
pub use merge::{merge_parameters, parameter_index};
pub use parameter::{Parameter, ParameterType};
pub use resource::Resource;
pub use update::{is_empty_value, ResourceUpdate};

/// Remote id of the built-in "All Pages" trigger. It exists in every
/// container but is never returned by trigger listings.
pub const ALL_PAGES_TRIGGER_ID: &str = "2147479553";

/// Display name of the built-in "All Pages" trigger.
pub const ALL_PAGES_TRIGGER_NAME: &str = "All Pages";
