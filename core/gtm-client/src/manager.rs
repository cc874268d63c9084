//! Entry point of the resource tree.

use crate::account::Account;
use crate::config::{CredentialsFile, GatewayConfig};
use crate::container::Container;
use crate::entity::{list_entities, Entity, Folder, Handle, Tag, Trigger, Variable};
use crate::error::GtmResult;
use crate::gateway::{Gateway, HttpGateway};
use crate::version::Version;
use crate::workspace::Workspace;
use gtm_model::AccountKind;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Lists accounts and loads any resource of the tree by path.
#[derive(Clone)]
pub struct Manager {
    gateway: Arc<dyn Gateway>,
}

impl Manager {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// A manager talking to the Tag Manager API with stored credentials.
    pub fn with_credentials(
        config: GatewayConfig,
        credentials: CredentialsFile,
    ) -> GtmResult<Self> {
        let gateway = HttpGateway::from_credentials(config, credentials)?;
        Ok(Self::new(Arc::new(gateway)))
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Every account the credentials can access.
    pub async fn list_accounts(&self) -> GtmResult<Vec<Account>> {
        let accounts = list_entities::<AccountKind>(&self.gateway, "").await?;
        debug!("Found {} accounts", accounts.len());
        Ok(accounts.into_iter().map(Account::from_entity).collect())
    }

    pub async fn account(&self, path: &str) -> GtmResult<Account> {
        Account::load(self.gateway.clone(), path).await
    }

    pub async fn container(&self, path: &str) -> GtmResult<Container> {
        Container::load(self.gateway.clone(), path).await
    }

    pub async fn workspace(&self, path: &str) -> GtmResult<Workspace> {
        Workspace::load(self.gateway.clone(), path).await
    }

    pub async fn tag(&self, path: &str) -> GtmResult<Tag> {
        Entity::load(self.gateway.clone(), path).await
    }

    pub async fn trigger(&self, path: &str) -> GtmResult<Trigger> {
        Entity::load(self.gateway.clone(), path).await
    }

    pub async fn variable(&self, path: &str) -> GtmResult<Variable> {
        Entity::load(self.gateway.clone(), path).await
    }

    pub async fn folder(&self, path: &str) -> GtmResult<Folder> {
        Entity::load(self.gateway.clone(), path).await
    }

    pub async fn version(&self, path: &str) -> GtmResult<Version> {
        Version::load(self.gateway.clone(), path).await
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager").finish_non_exhaustive()
    }
}
