//! Accounts.

use crate::container::Container;
use crate::entity::{ChildCache, Entity, Handle, Permission};
use crate::error::GtmResult;
use crate::gateway::Gateway;
use gtm_model::{AccountKind, ResourceUpdate};
use serde_json::{Map, Value};
use std::ops::Deref;
use std::sync::Arc;

/// Usage context of a container created without one.
const DEFAULT_USAGE_CONTEXT: &str = "web";

/// Fields of a new container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub usage_context: Vec<String>,
    pub domain_name: Vec<String>,
    pub notes: Option<String>,
}

impl ContainerSpec {
    /// A web container with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage_context: vec![DEFAULT_USAGE_CONTEXT.to_string()],
            domain_name: Vec::new(),
            notes: None,
        }
    }

    /// Replaces the usage context. An empty list keeps the web default.
    pub fn usage_context(mut self, contexts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let contexts: Vec<String> = contexts.into_iter().map(Into::into).collect();
        if !contexts.is_empty() {
            self.usage_context = contexts;
        }
        self
    }

    pub fn domain_name(mut self, domain: impl Into<String>) -> Self {
        self.domain_name.push(domain.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("name".to_string(), Value::from(self.name.clone()));
        let usage_context = if self.usage_context.is_empty() {
            vec![DEFAULT_USAGE_CONTEXT.to_string()]
        } else {
            self.usage_context.clone()
        };
        body.insert("usageContext".to_string(), Value::from(usage_context));
        if !self.domain_name.is_empty() {
            body.insert("domainName".to_string(), Value::from(self.domain_name.clone()));
        }
        if let Some(notes) = &self.notes {
            body.insert("notes".to_string(), Value::from(notes.clone()));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    entity: Entity<AccountKind>,
    containers: ChildCache<Container>,
    permissions: ChildCache<Permission>,
}

impl Handle for Account {
    type Kind = AccountKind;

    fn from_entity(entity: Entity<AccountKind>) -> Self {
        Self {
            entity,
            containers: ChildCache::default(),
            permissions: ChildCache::default(),
        }
    }

    fn entity(&self) -> &Entity<AccountKind> {
        &self.entity
    }
}

impl Account {
    pub fn new(entity: Entity<AccountKind>) -> Self {
        Self::from_entity(entity)
    }

    pub async fn load(gateway: Arc<dyn Gateway>, path: &str) -> GtmResult<Self> {
        Ok(Self::new(Entity::load(gateway, path).await?))
    }

    pub fn entity(&self) -> &Entity<AccountKind> {
        &self.entity
    }

    pub async fn update(&self, update: ResourceUpdate) -> GtmResult<Self> {
        Ok(Self::new(self.entity.update(update).await?))
    }

    pub async fn list_containers(&mut self, force_refresh: bool) -> GtmResult<&[Container]> {
        self.containers.list(&self.entity, force_refresh).await
    }

    pub async fn get_container_by_name(
        &mut self,
        name: &str,
        force_refresh: bool,
    ) -> GtmResult<Container> {
        self.containers
            .find_by_name(&self.entity, name, force_refresh)
            .await
    }

    /// User permissions granted on the account.
    pub async fn list_permissions(&mut self, force_refresh: bool) -> GtmResult<&[Permission]> {
        self.permissions.list(&self.entity, force_refresh).await
    }

    pub async fn create_container(&self, spec: &ContainerSpec) -> GtmResult<Container> {
        Ok(Container::new(self.entity.create_child(spec.to_body()).await?))
    }
}

impl Deref for Account {
    type Target = Entity<AccountKind>;

    fn deref(&self) -> &Entity<AccountKind> {
        &self.entity
    }
}
