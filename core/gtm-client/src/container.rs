//! Containers.

use crate::entity::{ChildCache, Entity, Handle, VersionHeader};
use crate::error::{GtmError, GtmResult};
use crate::gateway::{Gateway, GatewayCall, Operation};
use crate::version::Version;
use crate::workspace::Workspace;
use gtm_model::{ContainerKind, ResourceUpdate};
use serde_json::{json, Value};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// The published state of a container.
#[derive(Debug, Clone)]
pub enum LiveVersion {
    Published(Version),
    /// The container has never published a version.
    NotPublished,
}

impl LiveVersion {
    pub fn version(&self) -> Option<&Version> {
        match self {
            LiveVersion::Published(version) => Some(version),
            LiveVersion::NotPublished => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, LiveVersion::Published(_))
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    entity: Entity<ContainerKind>,
    workspaces: ChildCache<Workspace>,
    version_headers: ChildCache<VersionHeader>,
    live_version: Option<LiveVersion>,
}

impl Handle for Container {
    type Kind = ContainerKind;

    fn from_entity(entity: Entity<ContainerKind>) -> Self {
        Self {
            entity,
            workspaces: ChildCache::default(),
            version_headers: ChildCache::default(),
            live_version: None,
        }
    }

    fn entity(&self) -> &Entity<ContainerKind> {
        &self.entity
    }
}

impl Container {
    pub fn new(entity: Entity<ContainerKind>) -> Self {
        Self::from_entity(entity)
    }

    pub async fn load(gateway: Arc<dyn Gateway>, path: &str) -> GtmResult<Self> {
        Ok(Self::new(Entity::load(gateway, path).await?))
    }

    pub fn entity(&self) -> &Entity<ContainerKind> {
        &self.entity
    }

    pub async fn update(&self, update: ResourceUpdate) -> GtmResult<Self> {
        Ok(Self::new(self.entity.update(update).await?))
    }

    /// The published version, fetched once and cached.
    pub async fn live_version(&mut self, force_refresh: bool) -> GtmResult<&LiveVersion> {
        let live = match self.live_version.take() {
            Some(live) if !force_refresh => live,
            _ => self.fetch_live_version().await?,
        };
        Ok(self.live_version.insert(live))
    }

    async fn fetch_live_version(&self) -> GtmResult<LiveVersion> {
        let gateway = self.entity.gateway();
        match gateway
            .execute(GatewayCall::new(Operation::LiveVersion, self.path()))
            .await
        {
            Ok(response) => Ok(LiveVersion::Published(Version::from_representation(
                gateway.clone(),
                response,
            )?)),
            Err(GtmError::NoLiveVersion(_)) => {
                debug!("{} has no live version", self.path());
                Ok(LiveVersion::NotPublished)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list_workspaces(&mut self, force_refresh: bool) -> GtmResult<&[Workspace]> {
        self.workspaces.list(&self.entity, force_refresh).await
    }

    pub async fn get_workspace_by_name(
        &mut self,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<Workspace> {
        self.workspaces
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    /// Summaries of every stored version.
    pub async fn list_version_headers(
        &mut self,
        force_refresh: bool,
    ) -> GtmResult<&[VersionHeader]> {
        self.version_headers
            .list(&self.entity, force_refresh)
            .await
    }

    pub async fn create_workspace(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> GtmResult<Workspace> {
        let mut body = json!({ "name": name });
        if let Some(description) = description {
            body["description"] = Value::String(description.to_string());
        }
        Ok(Workspace::new(self.entity.create_child(body).await?))
    }
}

impl Deref for Container {
    type Target = Entity<ContainerKind>;

    fn deref(&self) -> &Entity<ContainerKind> {
        &self.entity
    }
}
