//! Remote-bound resource handles.

use crate::error::{GtmError, GtmResult};
use crate::gateway::{Gateway, GatewayCall};
use gtm_model::{
    BuiltInVariableKind, FolderKind, PermissionKind, Resource, ResourceKind, ResourceUpdate,
    TagKind, TriggerKind, VariableKind, VersionHeaderKind,
};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info};

pub type Tag = Entity<TagKind>;
pub type Trigger = Entity<TriggerKind>;
pub type Variable = Entity<VariableKind>;
pub type Folder = Entity<FolderKind>;
pub type BuiltInVariable = Entity<BuiltInVariableKind>;
pub type Permission = Entity<PermissionKind>;
pub type VersionHeader = Entity<VersionHeaderKind>;

/// A [`Resource`] bound to the gateway it was loaded through.
///
/// Handles are values: [`Entity::update`] returns the updated handle and
/// leaves the receiver untouched.
#[derive(Clone)]
pub struct Entity<K: ResourceKind> {
    gateway: Arc<dyn Gateway>,
    resource: Resource<K>,
}

impl<K: ResourceKind> Entity<K> {
    /// Binds a remote representation. See [`Resource::from_representation`]
    /// for the path rules.
    pub fn from_representation(
        gateway: Arc<dyn Gateway>,
        representation: Value,
        parent: Option<&str>,
    ) -> GtmResult<Self> {
        let resource = Resource::from_representation(representation, parent)?;
        Ok(Self { gateway, resource })
    }

    pub fn from_resource(gateway: Arc<dyn Gateway>, resource: Resource<K>) -> Self {
        Self { gateway, resource }
    }

    /// Fetches the resource at `path`.
    pub async fn load(gateway: Arc<dyn Gateway>, path: &str) -> GtmResult<Self> {
        debug!("Loading {} {}", K::NAME, path);
        let response = gateway.execute(GatewayCall::get(path)).await?;
        let resource = Resource::from_representation(with_path(response, path), None)?;
        Ok(Self { gateway, resource })
    }

    pub fn resource(&self) -> &Resource<K> {
        &self.resource
    }

    pub fn into_resource(self) -> Resource<K> {
        self.resource
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Fetches the current remote state of this resource.
    pub async fn reload(&self) -> GtmResult<Self> {
        Self::load(self.gateway.clone(), self.path()).await
    }

    /// Sends a whole-object update and returns the updated handle.
    ///
    /// With [`ResourceUpdate::refresh`] set, the remote state is fetched
    /// first and the body is computed from it instead of the local copy.
    pub async fn update(&self, update: ResourceUpdate) -> GtmResult<Self> {
        let refreshed;
        let current = if update.is_refresh() {
            refreshed = self.reload().await?;
            &refreshed.resource
        } else {
            &self.resource
        };

        let body = current.update_body(&update)?;
        info!("Updating {} {}", K::NAME, current.path());

        let response = self
            .gateway
            .execute(GatewayCall::update(current.path(), body))
            .await?;
        let resource = Resource::from_representation(with_path(response, current.path()), None)?;
        Ok(Self {
            gateway: self.gateway.clone(),
            resource,
        })
    }

    /// Deletes the remote resource.
    pub async fn delete(&self) -> GtmResult<()> {
        info!("Deleting {} {}", K::NAME, self.path());
        self.gateway.execute(GatewayCall::delete(self.path())).await?;
        Ok(())
    }

    /// Lists the children of kind `C` under this resource.
    pub(crate) async fn list_children<C: ResourceKind>(&self) -> GtmResult<Vec<Entity<C>>> {
        list_entities(&self.gateway, self.path()).await
    }

    /// Creates a child of kind `C` under this resource.
    pub(crate) async fn create_child<C: ResourceKind>(&self, body: Value) -> GtmResult<Entity<C>> {
        info!("Creating {} under {}", C::NAME, self.path());
        let response = self
            .gateway
            .execute(GatewayCall::create(self.path(), C::COLLECTION, body))
            .await?;
        Entity::from_representation(self.gateway.clone(), response, Some(self.path()))
    }
}

impl<K: ResourceKind> Deref for Entity<K> {
    type Target = Resource<K>;

    fn deref(&self) -> &Resource<K> {
        &self.resource
    }
}

impl<K: ResourceKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl<K: ResourceKind> fmt::Display for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.resource, f)
    }
}

impl<K: ResourceKind> PartialEq for Entity<K> {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource
    }
}

/// Lists the children of kind `C` under `parent` (empty for root collections).
pub(crate) async fn list_entities<C: ResourceKind>(
    gateway: &Arc<dyn Gateway>,
    parent: &str,
) -> GtmResult<Vec<Entity<C>>> {
    let response = gateway
        .execute(GatewayCall::list(parent, C::LIST_COLLECTION, C::LIST_FIELD))
        .await?;
    let parent = (!parent.is_empty()).then_some(parent);
    entities_from(gateway, response.get(C::LIST_FIELD), parent)
}

/// Binds every item of an optional list of representations.
pub(crate) fn entities_from<C: ResourceKind>(
    gateway: &Arc<dyn Gateway>,
    items: Option<&Value>,
    parent: Option<&str>,
) -> GtmResult<Vec<Entity<C>>> {
    match items {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| Entity::from_representation(gateway.clone(), item.clone(), parent))
            .collect(),
        Some(_) => Err(GtmError::Api {
            status: 200,
            message: format!("expected a list of {}", C::LIST_FIELD),
        }),
    }
}

/// Binds every item of an optional list of representations, synthesizing
/// each path under `parent`.
pub(crate) fn rehomed_entities<C: ResourceKind>(
    gateway: &Arc<dyn Gateway>,
    items: Option<&Value>,
    parent: &str,
) -> GtmResult<Vec<Entity<C>>> {
    match items {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| -> GtmResult<Entity<C>> {
                let resource = Resource::rehomed(item.clone(), parent)?;
                Ok(Entity::from_resource(gateway.clone(), resource))
            })
            .collect(),
        Some(_) => Err(GtmError::Api {
            status: 200,
            message: format!("expected a list of {}", C::LIST_FIELD),
        }),
    }
}

/// Inserts `path` into an object representation that lacks one.
pub(crate) fn with_path(mut representation: Value, path: &str) -> Value {
    if let Value::Object(fields) = &mut representation {
        let missing = fields
            .get("path")
            .and_then(Value::as_str)
            .is_none_or(str::is_empty);
        if missing {
            fields.insert("path".to_string(), Value::String(path.to_string()));
        }
    }
    representation
}

// ── Child caches ─────────────────────────────────────────────────

/// A typed handle built from an [`Entity`].
pub(crate) trait Handle: Clone + Send + Sync {
    type Kind: ResourceKind;

    fn from_entity(entity: Entity<Self::Kind>) -> Self;
    fn entity(&self) -> &Entity<Self::Kind>;
}

impl<K: ResourceKind> Handle for Entity<K> {
    type Kind = K;

    fn from_entity(entity: Entity<K>) -> Self {
        entity
    }

    fn entity(&self) -> &Entity<K> {
        self
    }
}

/// Lazily fetched children of one parent.
///
/// The first listing (or any forced one) replaces the cached list wholesale.
/// Later listings are served from the cache without a remote call.
#[derive(Debug, Clone)]
pub(crate) struct ChildCache<T> {
    items: Option<Vec<T>>,
}

impl<T> Default for ChildCache<T> {
    fn default() -> Self {
        Self { items: None }
    }
}

impl<T: Handle> ChildCache<T> {
    pub async fn list<P: ResourceKind>(
        &mut self,
        parent: &Entity<P>,
        force_refresh: bool,
    ) -> GtmResult<&[T]> {
        if force_refresh || self.items.is_none() {
            debug!(
                "Fetching {} of {}",
                <T::Kind as ResourceKind>::LIST_COLLECTION,
                parent.path()
            );
            let items = parent
                .list_children::<T::Kind>()
                .await?
                .into_iter()
                .map(T::from_entity)
                .collect();
            self.items = Some(items);
        }
        Ok(self.items.as_deref().expect("cache populated above"))
    }

    /// Linear search by display name over the (possibly refreshed) list.
    pub async fn find_by_name<P: ResourceKind>(
        &mut self,
        parent: &Entity<P>,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<T> {
        self.list(parent, force_refresh)
            .await?
            .iter()
            .find(|item| item.entity().name() == Some(name))
            .cloned()
            .ok_or_else(|| GtmError::NotFound {
                name: name.to_string(),
                parent: parent.path().to_string(),
            })
    }

    pub fn is_cached(&self) -> bool {
        self.items.is_some()
    }
}
