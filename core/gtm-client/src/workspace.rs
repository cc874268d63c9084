//! Workspaces and their bulk operations.

use crate::entity::{
    entities_from, BuiltInVariable, ChildCache, Entity, Folder, Handle, Tag, Trigger, Variable,
};
use crate::error::{GtmError, GtmResult};
use crate::gateway::{Gateway, GatewayCall, Operation};
use crate::sync::{SyncOutcome, WorkspaceStatus};
use crate::version::Version;
use gtm_model::{
    BuiltInVariableKind, ResourceKind, ResourceUpdate, WorkspaceKind, ALL_PAGES_TRIGGER_ID,
    ALL_PAGES_TRIGGER_NAME,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on variable deletion rounds in [`Workspace::clear_all_assets`].
pub const MAX_VARIABLE_DELETE_ROUNDS: usize = 10;

/// Version id returned by `create_version` when nothing was created.
const FAILED_VERSION_ID: &str = "0";

/// What [`Workspace::clear_all_assets`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub tags_deleted: usize,
    pub triggers_deleted: usize,
    /// Variable deletes across all rounds.
    pub variable_deletes: usize,
    pub variable_rounds: usize,
    /// Variables still reported after the last round.
    pub variables_remaining: usize,
    pub folders_deleted: usize,
}

/// An editable workspace of a container.
///
/// Child listings and the quick preview are fetched on first use and cached
/// until a forced refresh.
#[derive(Debug, Clone)]
pub struct Workspace {
    entity: Entity<WorkspaceKind>,
    tags: ChildCache<Tag>,
    triggers: ChildCache<Trigger>,
    variables: ChildCache<Variable>,
    folders: ChildCache<Folder>,
    built_in_variables: ChildCache<BuiltInVariable>,
    quick_preview: Option<Version>,
}

impl Handle for Workspace {
    type Kind = WorkspaceKind;

    fn from_entity(entity: Entity<WorkspaceKind>) -> Self {
        Self {
            entity,
            tags: ChildCache::default(),
            triggers: ChildCache::default(),
            variables: ChildCache::default(),
            folders: ChildCache::default(),
            built_in_variables: ChildCache::default(),
            quick_preview: None,
        }
    }

    fn entity(&self) -> &Entity<WorkspaceKind> {
        &self.entity
    }
}

impl Workspace {
    pub fn new(entity: Entity<WorkspaceKind>) -> Self {
        Self::from_entity(entity)
    }

    pub async fn load(gateway: Arc<dyn Gateway>, path: &str) -> GtmResult<Self> {
        Ok(Self::new(Entity::load(gateway, path).await?))
    }

    pub fn entity(&self) -> &Entity<WorkspaceKind> {
        &self.entity
    }

    /// Sends a whole-object update. The returned workspace starts with empty
    /// caches.
    pub async fn update(&self, update: ResourceUpdate) -> GtmResult<Self> {
        Ok(Self::new(self.entity.update(update).await?))
    }

    // ── Children ─────────────────────────────────────────────────

    pub async fn list_tags(&mut self, force_refresh: bool) -> GtmResult<&[Tag]> {
        self.tags.list(&self.entity, force_refresh).await
    }

    pub async fn list_triggers(&mut self, force_refresh: bool) -> GtmResult<&[Trigger]> {
        self.triggers.list(&self.entity, force_refresh).await
    }

    pub async fn list_variables(&mut self, force_refresh: bool) -> GtmResult<&[Variable]> {
        self.variables.list(&self.entity, force_refresh).await
    }

    pub async fn list_folders(&mut self, force_refresh: bool) -> GtmResult<&[Folder]> {
        self.folders.list(&self.entity, force_refresh).await
    }

    /// Built-in variables currently enabled in the workspace.
    pub async fn list_built_in_variables(
        &mut self,
        force_refresh: bool,
    ) -> GtmResult<&[BuiltInVariable]> {
        self.built_in_variables
            .list(&self.entity, force_refresh)
            .await
    }

    pub async fn get_tag_by_name(&mut self, name: &str, force_refresh: bool) -> GtmResult<Tag> {
        self.tags
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    pub async fn get_trigger_by_name(
        &mut self,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<Trigger> {
        self.triggers
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    pub async fn get_variable_by_name(
        &mut self,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<Variable> {
        self.variables
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    pub async fn get_folder_by_name(
        &mut self,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<Folder> {
        self.folders
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    /// Creates a tag from its full representation. Cached listings are left
    /// as they are.
    pub async fn create_tag(&self, body: Value) -> GtmResult<Tag> {
        self.entity.create_child(body).await
    }

    pub async fn create_trigger(&self, body: Value) -> GtmResult<Trigger> {
        self.entity.create_child(body).await
    }

    pub async fn create_variable(&self, body: Value) -> GtmResult<Variable> {
        self.entity.create_child(body).await
    }

    pub async fn create_folder(&self, name: &str, notes: Option<&str>) -> GtmResult<Folder> {
        let mut body = json!({ "name": name });
        if let Some(notes) = notes {
            body["notes"] = Value::String(notes.to_string());
        }
        self.entity.create_child(body).await
    }

    /// Enables built-in variables by type (e.g. `pageUrl`, `clickText`).
    pub async fn create_built_ins(&self, types: &[&str]) -> GtmResult<Vec<BuiltInVariable>> {
        info!("Enabling built-in variables {:?} in {}", types, self.path());
        let call = types.iter().fold(
            GatewayCall::new(Operation::CreateBuiltIns, self.path()),
            |call, kind| call.with_query("type", *kind),
        );
        let response = self.entity.gateway().execute(call).await?;
        entities_from(
            self.entity.gateway(),
            response.get(BuiltInVariableKind::LIST_FIELD),
            Some(self.path()),
        )
    }

    /// Disables built-in variables by type.
    pub async fn disable_built_ins(&self, types: &[&str]) -> GtmResult<()> {
        info!("Disabling built-in variables {:?} in {}", types, self.path());
        let call = types.iter().fold(
            GatewayCall::new(Operation::DeleteBuiltIns, self.path()),
            |call, kind| call.with_query("type", *kind),
        );
        self.entity.gateway().execute(call).await?;
        Ok(())
    }

    // ── Preview and bulk operations ──────────────────────────────

    /// The compiled preview of the workspace. A failed refresh keeps the
    /// previously cached preview.
    pub async fn quick_preview(&mut self, force_refresh: bool) -> GtmResult<&Version> {
        if force_refresh || self.quick_preview.is_none() {
            let preview = Self::fetch_quick_preview(&self.entity).await?;
            self.quick_preview = Some(preview);
        }
        Ok(self.quick_preview.as_ref().expect("cache populated above"))
    }

    async fn fetch_quick_preview(workspace: &Entity<WorkspaceKind>) -> GtmResult<Version> {
        debug!("Compiling quick preview of {}", workspace.path());
        let response = workspace
            .gateway()
            .execute(GatewayCall::new(Operation::QuickPreview, workspace.path()))
            .await?;

        let Some(raw) = response.get("containerVersion").filter(|v| v.is_object()) else {
            return Err(GtmError::Api {
                status: 200,
                message: format!(
                    "quick preview of {} returned no container version",
                    workspace.path()
                ),
            });
        };
        Version::from_quick_preview(
            workspace.gateway().clone(),
            raw.clone(),
            workspace.path(),
            workspace.id().unwrap_or_default(),
        )
    }

    /// Deletes every tag, trigger, variable and folder of the workspace.
    ///
    /// Variables may reference each other, so they are deleted in reverse
    /// listed order over up to [`MAX_VARIABLE_DELETE_ROUNDS`] rounds, with
    /// the preview re-fetched after each round. Any failed delete aborts
    /// the clear.
    pub async fn clear_all_assets(&mut self, force_refresh: bool) -> GtmResult<ClearReport> {
        let mut preview = self.quick_preview(force_refresh).await?.clone();
        let mut report = ClearReport::default();
        info!("Clearing all assets of {}", self.path());

        for tag in preview.tags() {
            tag.delete().await?;
            report.tags_deleted += 1;
        }

        for trigger in preview.triggers() {
            trigger.delete().await?;
            report.triggers_deleted += 1;
        }

        for round in 1..=MAX_VARIABLE_DELETE_ROUNDS {
            if preview.variables().is_empty() {
                break;
            }
            debug!(
                "Variable round {}: {} left in {}",
                round,
                preview.variables().len(),
                self.path()
            );

            for variable in preview.variables().iter().rev() {
                variable.delete().await?;
                report.variable_deletes += 1;
            }

            report.variable_rounds = round;
            preview = self.quick_preview(true).await?.clone();
        }
        report.variables_remaining = preview.variables().len();
        if report.variables_remaining > 0 {
            warn!(
                "{} variables left in {} after {} rounds",
                report.variables_remaining,
                self.path(),
                report.variable_rounds
            );
        }

        for folder in preview.folders() {
            folder.delete().await?;
            report.folders_deleted += 1;
        }

        Ok(report)
    }

    /// Trigger names and ids mapped in both directions, seeded with the
    /// built-in "All Pages" trigger.
    pub async fn trigger_map(
        &mut self,
        force_refresh: bool,
    ) -> GtmResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        map.insert(ALL_PAGES_TRIGGER_ID.to_string(), ALL_PAGES_TRIGGER_NAME.to_string());
        map.insert(ALL_PAGES_TRIGGER_NAME.to_string(), ALL_PAGES_TRIGGER_ID.to_string());

        for trigger in self.quick_preview(force_refresh).await?.triggers() {
            insert_both_ways(&mut map, trigger.name(), trigger.id());
        }
        Ok(map)
    }

    /// Folder names and ids mapped in both directions.
    pub async fn folder_map(&mut self, force_refresh: bool) -> GtmResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for folder in self.quick_preview(force_refresh).await?.folders() {
            insert_both_ways(&mut map, folder.name(), folder.id());
        }
        Ok(map)
    }

    /// Creates a version from the workspace.
    pub async fn create_version(&self, name: &str, notes: &str) -> GtmResult<Version> {
        info!("Creating version {:?} from {}", name, self.path());
        let response = self
            .entity
            .gateway()
            .execute(
                GatewayCall::new(Operation::CreateVersion, self.path())
                    .with_body(json!({ "name": name, "notes": notes })),
            )
            .await?;

        let raw = response.get("containerVersion").filter(|v| v.is_object());
        let created = raw.filter(|v| {
            v.get("containerVersionId").and_then(Value::as_str) != Some(FAILED_VERSION_ID)
        });
        match created {
            Some(raw) => Version::from_representation(self.entity.gateway().clone(), raw.clone()),
            None => Err(GtmError::PublishFailure {
                workspace: self.path().to_string(),
                url: self.tag_manager_url().unwrap_or_default().to_string(),
            }),
        }
    }

    /// Brings the workspace up to date with the latest container version.
    pub async fn sync(&self) -> GtmResult<SyncOutcome> {
        info!("Syncing {}", self.path());
        let response = self
            .entity
            .gateway()
            .execute(GatewayCall::new(Operation::Sync, self.path()))
            .await?;
        let outcome = SyncOutcome::from_response(self.entity.gateway(), &response, self.path())?;
        if outcome.has_conflicts() {
            warn!(
                "{} merge conflicts while syncing {}",
                outcome.merge_conflicts.len(),
                self.path()
            );
        }
        Ok(outcome)
    }

    pub async fn get_status(&self) -> GtmResult<WorkspaceStatus> {
        let response = self
            .entity
            .gateway()
            .execute(GatewayCall::new(Operation::GetStatus, self.path()))
            .await?;
        if response.is_null() {
            return Ok(WorkspaceStatus::default());
        }
        Ok(serde_json::from_value(response)?)
    }
}

impl Deref for Workspace {
    type Target = Entity<WorkspaceKind>;

    fn deref(&self) -> &Entity<WorkspaceKind> {
        &self.entity
    }
}

fn insert_both_ways(map: &mut BTreeMap<String, String>, name: Option<&str>, id: Option<&str>) {
    if let (Some(name), Some(id)) = (name, id) {
        map.insert(id.to_string(), name.to_string());
        map.insert(name.to_string(), id.to_string());
    }
}
