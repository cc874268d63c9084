//! Container versions and workspace previews.

use crate::entity::{
    entities_from, rehomed_entities, with_path, BuiltInVariable, Entity, Folder, Tag, Trigger,
    Variable,
};
use crate::error::{GtmError, GtmResult};
use crate::gateway::{Gateway, GatewayCall, Operation};
use gtm_model::{ContainerKind, ModelError, Resource, ResourceKind, VersionKind};
use serde_json::{Map, Value};
use std::ops::Deref;
use std::sync::Arc;
use tracing::info;

/// Version id the API reports for a compiled preview.
const PREVIEW_VERSION_ID: &str = "0";

/// A snapshot of a container, either a stored version or the compiled
/// preview of a workspace.
#[derive(Debug, Clone)]
pub struct Version {
    entity: Entity<VersionKind>,
    container: Option<Entity<ContainerKind>>,
    tags: Vec<Tag>,
    triggers: Vec<Trigger>,
    variables: Vec<Variable>,
    folders: Vec<Folder>,
    built_in_variables: Vec<BuiltInVariable>,
    workspace_id: Option<String>,
}

/// Result of publishing a version.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub version: Option<Version>,
    pub compiler_error: bool,
}

impl Version {
    /// Binds a stored version. Children without a path of their own are
    /// addressed under the version path.
    pub fn from_representation(
        gateway: Arc<dyn Gateway>,
        representation: Value,
    ) -> GtmResult<Self> {
        let (fields, children) = Children::split(representation)?;
        let parent = container_path(&fields);
        let entity =
            Entity::from_representation(gateway.clone(), Value::Object(fields), parent.as_deref())?;

        let version_path = entity.path().to_string();
        children.bind(gateway, entity, None, Placement::Under(Some(&version_path)))
    }

    /// Binds the preview compiled from a workspace. Every child is addressed
    /// under the workspace it was compiled from. The preview itself is
    /// addressed as a version of its container, so it never aliases the
    /// workspace.
    pub(crate) fn from_quick_preview(
        gateway: Arc<dyn Gateway>,
        representation: Value,
        workspace_path: &str,
        workspace_id: &str,
    ) -> GtmResult<Self> {
        let (mut fields, children) = Children::split(representation)?;
        let children_parent = match container_path(&fields) {
            Some(container) => format!("{container}/workspaces/{workspace_id}"),
            None => workspace_path.to_string(),
        };

        let container = container_path(&fields).unwrap_or_else(|| {
            workspace_path
                .rsplit_once("/workspaces/")
                .map_or(workspace_path, |(container, _)| container)
                .to_string()
        });
        let version_id = fields
            .get("containerVersionId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(PREVIEW_VERSION_ID);
        let path = format!("{container}/versions/{version_id}");
        fields.insert("path".to_string(), Value::String(path));
        let entity = Entity::from_representation(gateway.clone(), Value::Object(fields), None)?;

        children.bind(
            gateway,
            entity,
            Some(workspace_id.to_string()),
            Placement::Rehomed(&children_parent),
        )
    }

    /// Fetches the version at `path`.
    pub async fn load(gateway: Arc<dyn Gateway>, path: &str) -> GtmResult<Self> {
        let response = gateway.execute(GatewayCall::get(path)).await?;
        Self::from_representation(gateway, with_path(response, path))
    }

    pub fn entity(&self) -> &Entity<VersionKind> {
        &self.entity
    }

    pub fn container(&self) -> Option<&Entity<ContainerKind>> {
        self.container.as_ref()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn built_in_variables(&self) -> &[BuiltInVariable] {
        &self.built_in_variables
    }

    /// The workspace a preview was compiled from.
    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn container_version_id(&self) -> Option<&str> {
        self.entity.str_field("containerVersionId")
    }

    pub fn description(&self) -> Option<&str> {
        self.entity.str_field("description")
    }

    /// Publishes this version as the live version of its container.
    pub async fn publish(&self) -> GtmResult<PublishOutcome> {
        info!("Publishing version {}", self.path());
        let response = self
            .entity
            .gateway()
            .execute(GatewayCall::new(Operation::Publish, self.path()))
            .await?;

        let compiler_error = response
            .get("compilerError")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let version = match response.get("containerVersion") {
            Some(raw) if raw.is_object() => Some(Self::from_representation(
                self.entity.gateway().clone(),
                raw.clone(),
            )?),
            _ => None,
        };

        Ok(PublishOutcome {
            version,
            compiler_error,
        })
    }

    /// The full representation, children included.
    pub fn to_value(&self) -> GtmResult<Value> {
        let mut value = self.entity.to_value()?;
        if let Value::Object(object) = &mut value {
            if let Some(container) = &self.container {
                object.insert("container".to_string(), container.to_value()?);
            }
            insert_list(object, "tag", &self.tags)?;
            insert_list(object, "trigger", &self.triggers)?;
            insert_list(object, "variable", &self.variables)?;
            insert_list(object, "folder", &self.folders)?;
            insert_list(object, "builtInVariable", &self.built_in_variables)?;
        }
        Ok(value)
    }
}

impl Deref for Version {
    type Target = Entity<VersionKind>;

    fn deref(&self) -> &Entity<VersionKind> {
        &self.entity
    }
}

/// `accounts/{accountId}/containers/{containerId}` when both ids are known.
fn container_path(fields: &Map<String, Value>) -> Option<String> {
    let account = fields.get("accountId").and_then(Value::as_str)?;
    let container = fields.get("containerId").and_then(Value::as_str)?;
    Some(format!("accounts/{account}/containers/{container}"))
}

fn insert_list<K: ResourceKind>(
    object: &mut Map<String, Value>,
    field: &str,
    entities: &[Entity<K>],
) -> GtmResult<()> {
    if entities.is_empty() {
        return Ok(());
    }
    let items = entities
        .iter()
        .map(|e| e.to_value())
        .collect::<Result<Vec<_>, _>>()?;
    object.insert(field.to_string(), Value::Array(items));
    Ok(())
}

/// Where the children of a version are addressed.
enum Placement<'a> {
    /// Under their own `path`, else synthesized under the given parent.
    Under(Option<&'a str>),
    /// Always synthesized under the given parent.
    Rehomed(&'a str),
}

impl Placement<'_> {
    fn bind<K: ResourceKind>(
        &self,
        gateway: &Arc<dyn Gateway>,
        items: Option<&Value>,
    ) -> GtmResult<Vec<Entity<K>>> {
        match *self {
            Placement::Under(parent) => entities_from(gateway, items, parent),
            Placement::Rehomed(parent) => rehomed_entities(gateway, items, parent),
        }
    }
}

/// The raw child lists of a version representation.
struct Children {
    container: Option<Value>,
    tags: Option<Value>,
    triggers: Option<Value>,
    variables: Option<Value>,
    folders: Option<Value>,
    built_in_variables: Option<Value>,
}

impl Children {
    fn split(representation: Value) -> GtmResult<(Map<String, Value>, Self)> {
        let Value::Object(mut fields) = representation else {
            return Err(GtmError::Model(ModelError::Validation(
                "containerVersion representation must be a JSON object".to_string(),
            )));
        };

        let children = Self {
            container: fields.remove("container"),
            tags: fields.remove("tag"),
            triggers: fields.remove("trigger"),
            variables: fields.remove("variable"),
            folders: fields.remove("folder"),
            built_in_variables: fields.remove("builtInVariable"),
        };
        Ok((fields, children))
    }

    fn bind(
        self,
        gateway: Arc<dyn Gateway>,
        entity: Entity<VersionKind>,
        workspace_id: Option<String>,
        placement: Placement<'_>,
    ) -> GtmResult<Version> {
        let account_path = entity.account_id().map(|id| format!("accounts/{id}"));
        let container = match self.container {
            Some(raw) if raw.is_object() => {
                let resource = Resource::from_representation(raw, account_path.as_deref())?;
                Some(Entity::from_resource(gateway.clone(), resource))
            }
            _ => None,
        };

        Ok(Version {
            tags: placement.bind(&gateway, self.tags.as_ref())?,
            triggers: placement.bind(&gateway, self.triggers.as_ref())?,
            variables: placement.bind(&gateway, self.variables.as_ref())?,
            folders: placement.bind(&gateway, self.folders.as_ref())?,
            built_in_variables: placement.bind(&gateway, self.built_in_variables.as_ref())?,
            entity,
            container,
            workspace_id,
        })
    }
}
