//! Kind-specific field accessors.

use crate::kind::{
    AccountKind, ContainerKind, PermissionKind, TagKind, VariableKind, VersionHeaderKind,
    WorkspaceKind,
};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

impl Resource<AccountKind> {
    /// Whether the account shares data anonymously with Google.
    pub fn share_data(&self) -> bool {
        self.bool_field("shareData").unwrap_or(false)
    }
}

impl Resource<ContainerKind> {
    /// The public `GTM-XXXX` id.
    pub fn public_id(&self) -> Option<&str> {
        self.str_field("publicId")
    }

    /// Usage contexts (`web`, `android`, `ios`, ...).
    pub fn usage_context(&self) -> Vec<&str> {
        self.str_list_field("usageContext")
    }

    pub fn domain_names(&self) -> Vec<&str> {
        self.str_list_field("domainName")
    }
}

impl Resource<WorkspaceKind> {
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }
}

impl Resource<TagKind> {
    pub fn firing_trigger_ids(&self) -> Vec<&str> {
        self.str_list_field("firingTriggerId")
    }

    pub fn blocking_trigger_ids(&self) -> Vec<&str> {
        self.str_list_field("blockingTriggerId")
    }

    /// Paused tags never fire.
    pub fn paused(&self) -> bool {
        self.bool_field("paused").unwrap_or(false)
    }

    pub fn tag_firing_option(&self) -> Option<&str> {
        self.str_field("tagFiringOption")
    }
}

/// Variable type of a constant.
const CONSTANT_VARIABLE_TYPE: &str = "c";

impl Resource<VariableKind> {
    /// The value of a constant variable, held by its first parameter.
    /// `None` for every other variable type.
    pub fn constant_value(&self) -> Option<&str> {
        if self.entity_type() != Some(CONSTANT_VARIABLE_TYPE) {
            return None;
        }
        self.parameters().first()?.value.as_deref()
    }
}

/// Access granted to one container by a user permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAccess {
    pub container_id: String,
    pub permission: String,
}

impl Resource<PermissionKind> {
    pub fn email_address(&self) -> Option<&str> {
        self.str_field("emailAddress")
    }

    /// The account-level permission, e.g. `user` or `admin`.
    pub fn account_access(&self) -> Option<&str> {
        self.field("accountAccess")
            .and_then(|access| access.get("permission"))
            .and_then(Value::as_str)
    }

    /// Per-container grants. Malformed entries are skipped.
    pub fn container_access(&self) -> Vec<ContainerAccess> {
        self.field("containerAccess")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Resource<VersionHeaderKind> {
    fn count(&self, field: &str) -> u64 {
        // Counters are int64 on the wire, encoded as strings.
        match self.field(field) {
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn num_tags(&self) -> u64 {
        self.count("numTags")
    }

    pub fn num_triggers(&self) -> u64 {
        self.count("numTriggers")
    }

    pub fn num_variables(&self) -> u64 {
        self.count("numVariables")
    }

    pub fn num_zones(&self) -> u64 {
        self.count("numZones")
    }

    pub fn deleted(&self) -> bool {
        self.bool_field("deleted").unwrap_or(false)
    }
}
