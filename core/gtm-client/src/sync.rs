//! Workspace synchronization and status results.

use crate::entity::{Entity, Folder, Tag, Trigger, Variable};
use crate::error::GtmResult;
use crate::gateway::Gateway;
use gtm_model::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Flags reported by a sync call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncStatus {
    pub merge_conflict: bool,
    pub sync_error: bool,
}

/// Result of bringing a workspace up to date with the latest version.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    pub merge_conflicts: Vec<MergeConflict>,
}

impl SyncOutcome {
    /// Rehydrates a sync response. A missing conflict list means no
    /// conflicts.
    pub(crate) fn from_response(
        gateway: &Arc<dyn Gateway>,
        response: &Value,
        workspace_path: &str,
    ) -> GtmResult<Self> {
        let status = match response.get("syncStatus") {
            Some(raw) if !raw.is_null() => serde_json::from_value(raw.clone())?,
            _ => SyncStatus::default(),
        };

        let merge_conflicts = match response.get("mergeConflict") {
            Some(Value::Array(conflicts)) => conflicts
                .iter()
                .map(|c| MergeConflict::from_value(gateway, c, workspace_path))
                .collect::<GtmResult<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            status,
            merge_conflicts,
        })
    }

    pub fn has_conflicts(&self) -> bool {
        !self.merge_conflicts.is_empty()
    }
}

/// One entity changed both in the workspace and in the base version.
#[derive(Debug, Clone, Default)]
pub struct MergeConflict {
    pub entity_in_workspace: ConflictEntity,
    pub entity_in_base_version: ConflictEntity,
}

impl MergeConflict {
    fn from_value(gateway: &Arc<dyn Gateway>, value: &Value, parent: &str) -> GtmResult<Self> {
        Ok(Self {
            entity_in_workspace: ConflictEntity::from_value(
                gateway,
                value.get("entityInWorkspace"),
                parent,
            )?,
            entity_in_base_version: ConflictEntity::from_value(
                gateway,
                value.get("entityInBaseVersion"),
                parent,
            )?,
        })
    }

    pub fn to_value(&self) -> GtmResult<Value> {
        let mut object = Map::new();
        object.insert(
            "entityInWorkspace".to_string(),
            self.entity_in_workspace.to_value()?,
        );
        object.insert(
            "entityInBaseVersion".to_string(),
            self.entity_in_base_version.to_value()?,
        );
        Ok(Value::Object(object))
    }
}

/// One side of a merge conflict. At most one of the entity slots is set.
#[derive(Debug, Clone, Default)]
pub struct ConflictEntity {
    pub tag: Option<Tag>,
    pub trigger: Option<Trigger>,
    pub variable: Option<Variable>,
    pub folder: Option<Folder>,
    /// `added`, `deleted`, `updated` or `none`.
    pub change_status: Option<String>,
}

impl ConflictEntity {
    fn from_value(
        gateway: &Arc<dyn Gateway>,
        value: Option<&Value>,
        parent: &str,
    ) -> GtmResult<Self> {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return Ok(Self::default());
        };

        Ok(Self {
            tag: slot(gateway, value, "tag", parent)?,
            trigger: slot(gateway, value, "trigger", parent)?,
            variable: slot(gateway, value, "variable", parent)?,
            folder: slot(gateway, value, "folder", parent)?,
            change_status: value
                .get("changeStatus")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.trigger.is_none()
            && self.variable.is_none()
            && self.folder.is_none()
    }

    /// Display name of whichever entity is set.
    pub fn name(&self) -> Option<&str> {
        self.tag
            .as_ref()
            .and_then(|e| e.name())
            .or_else(|| self.trigger.as_ref().and_then(|e| e.name()))
            .or_else(|| self.variable.as_ref().and_then(|e| e.name()))
            .or_else(|| self.folder.as_ref().and_then(|e| e.name()))
    }

    pub fn to_value(&self) -> GtmResult<Value> {
        let mut object = Map::new();
        put(&mut object, "tag", self.tag.as_ref())?;
        put(&mut object, "trigger", self.trigger.as_ref())?;
        put(&mut object, "variable", self.variable.as_ref())?;
        put(&mut object, "folder", self.folder.as_ref())?;
        if let Some(status) = &self.change_status {
            object.insert("changeStatus".to_string(), Value::String(status.clone()));
        }
        Ok(Value::Object(object))
    }
}

fn slot<K: ResourceKind>(
    gateway: &Arc<dyn Gateway>,
    value: &Value,
    field: &str,
    parent: &str,
) -> GtmResult<Option<Entity<K>>> {
    match value.get(field) {
        Some(raw) if raw.is_object() => Ok(Some(Entity::from_representation(
            gateway.clone(),
            raw.clone(),
            Some(parent),
        )?)),
        _ => Ok(None),
    }
}

fn put<K: ResourceKind>(
    object: &mut Map<String, Value>,
    field: &str,
    entity: Option<&Entity<K>>,
) -> GtmResult<()> {
    if let Some(entity) = entity {
        object.insert(field.to_string(), entity.to_value()?);
    }
    Ok(())
}

/// Pending changes of a workspace relative to its base version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceStatus {
    pub workspace_change: Vec<Value>,
    pub merge_conflict: Vec<Value>,
}

impl WorkspaceStatus {
    pub fn is_clean(&self) -> bool {
        self.workspace_change.is_empty() && self.merge_conflict.is_empty()
    }
}
