//! The generic resource value.

use crate::error::{ModelError, ModelResult};
use crate::kind::ResourceKind;
use crate::merge::{merge_parameters, parameter_index};
use crate::parameter::Parameter;
use crate::update::{is_empty_value, ResourceUpdate};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// A local, path-addressed copy of one remote resource.
///
/// The path is fixed at construction. Every other field is kept exactly as
/// the remote service returned it, except the `parameter` tree of kinds that
/// have one, which is parsed into [`Parameter`] nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<K: ResourceKind> {
    path: String,
    fields: Map<String, Value>,
    parameters: Vec<Parameter>,
    kind: PhantomData<K>,
}

impl<K: ResourceKind> Resource<K> {
    /// Builds a resource from its remote representation.
    ///
    /// The path is taken from the representation's `path` field. Child
    /// resources returned by create calls may omit it; the path is then
    /// synthesized as `{parent}/{collection}/{id}`.
    pub fn from_representation(representation: Value, parent: Option<&str>) -> ModelResult<Self> {
        let (fields, parameters) = Self::split(representation)?;

        let path = match fields.get("path").and_then(Value::as_str) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => {
                let parent = parent.ok_or_else(|| {
                    ModelError::Validation(format!(
                        "{} representation has no path and no parent path was given",
                        K::NAME
                    ))
                })?;
                Self::synthesize_path(parent, &fields)?
            }
        };

        Ok(Self {
            path,
            fields,
            parameters,
            kind: PhantomData,
        })
    }

    /// Builds a resource whose path always threads through `parent`,
    /// ignoring any `path` in the representation. Used for the entities of
    /// a workspace preview, whose own paths do not address the workspace.
    pub fn rehomed(representation: Value, parent: &str) -> ModelResult<Self> {
        let (fields, parameters) = Self::split(representation)?;
        let path = Self::synthesize_path(parent, &fields)?;

        Ok(Self {
            path,
            fields,
            parameters,
            kind: PhantomData,
        })
    }

    fn split(representation: Value) -> ModelResult<(Map<String, Value>, Vec<Parameter>)> {
        let Value::Object(mut fields) = representation else {
            return Err(ModelError::Validation(format!(
                "{} representation must be a JSON object",
                K::NAME
            )));
        };

        let parameters = if K::HAS_PARAMETERS {
            match fields.remove("parameter") {
                Some(raw) => Parameter::parse_list(&raw)?,
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        Ok((fields, parameters))
    }

    fn synthesize_path(parent: &str, fields: &Map<String, Value>) -> ModelResult<String> {
        let id = fields
            .get(K::ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(ModelError::MissingField {
                kind: K::NAME,
                field: if K::ID_FIELD.is_empty() { "path" } else { K::ID_FIELD },
            })?;

        Ok(format!(
            "{}/{}/{}",
            parent.trim_end_matches('/'),
            K::COLLECTION,
            id
        ))
    }

    // ── Identity ─────────────────────────────────────────────────

    /// The remote path addressing this resource.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path of the owning resource (the path minus its last two segments).
    pub fn parent_path(&self) -> Option<&str> {
        let (rest, _id) = self.path.rsplit_once('/')?;
        let (parent, _collection) = rest.rsplit_once('/')?;
        Some(parent)
    }

    /// The resource id. Kinds without an id field fall back to the last path
    /// segment.
    pub fn id(&self) -> Option<&str> {
        if K::ID_FIELD.is_empty() {
            return self.path.rsplit('/').next();
        }
        self.str_field(K::ID_FIELD)
    }

    /// The display name (for permissions, the e-mail address).
    pub fn name(&self) -> Option<&str> {
        self.str_field(K::NAME_FIELD)
    }

    /// Opaque server-side change token.
    pub fn fingerprint(&self) -> Option<&str> {
        self.str_field("fingerprint")
    }

    pub fn account_id(&self) -> Option<&str> {
        self.str_field("accountId")
    }

    pub fn container_id(&self) -> Option<&str> {
        self.str_field("containerId")
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.str_field("workspaceId")
    }

    // ── Common fields ────────────────────────────────────────────

    pub fn notes(&self) -> Option<&str> {
        self.str_field("notes")
    }

    /// Link to the resource in the Tag Manager UI.
    pub fn tag_manager_url(&self) -> Option<&str> {
        self.str_field("tagManagerUrl")
    }

    pub fn parent_folder_id(&self) -> Option<&str> {
        self.str_field("parentFolderId")
    }

    /// The `type` field (tag template, trigger type, variable type, ...).
    pub fn entity_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Raw access to any field of the representation.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    /// A field holding a list of strings; absent or malformed fields yield an
    /// empty list.
    pub fn str_list_field(&self, name: &str) -> Vec<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    // ── Parameters ───────────────────────────────────────────────

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a top-level parameter by key; the last node wins when a key
    /// repeats.
    pub fn parameter(&self, key: &str) -> Option<&Parameter> {
        self.parameters.iter().rev().find(|p| p.key == key)
    }

    /// Top-level parameters indexed by key.
    pub fn parameter_map(&self) -> HashMap<&str, &Parameter> {
        parameter_index(&self.parameters)
    }

    // ── Serialization ────────────────────────────────────────────

    /// The full representation: every field, the path, and the parameter
    /// tree for kinds that own one.
    pub fn to_value(&self) -> ModelResult<Value> {
        let mut fields = self.fields.clone();
        fields.insert("path".to_string(), Value::String(self.path.clone()));
        if K::HAS_PARAMETERS && !self.parameters.is_empty() {
            fields.insert(
                "parameter".to_string(),
                Parameter::list_to_value(&self.parameters)?,
            );
        }
        Ok(Value::Object(fields))
    }

    /// Computes the body of a whole-object update.
    ///
    /// Starts from the kind's update fields of the current state, lets the
    /// caller's overrides win, merges the parameter overrides by key onto the
    /// current parameters, and drops every empty value.
    pub fn update_body(&self, update: &ResourceUpdate) -> ModelResult<Value> {
        let mut body = Map::new();

        for field in K::UPDATE_FIELDS {
            if let Some(value) = self.fields.get(*field) {
                body.insert((*field).to_string(), value.clone());
            }
        }

        for (field, value) in update.fields() {
            body.insert(field.clone(), value.clone());
        }

        if K::HAS_PARAMETERS {
            let parameters = match update.override_parameters() {
                Some(overlay) if !overlay.is_empty() => merge_parameters(&self.parameters, overlay),
                _ => self.parameters.clone(),
            };
            body.insert(
                "parameter".to_string(),
                Parameter::list_to_value(&parameters)?,
            );
        }

        body.retain(|_, value| !is_empty_value(value));
        Ok(Value::Object(body))
    }
}

impl<K: ResourceKind> fmt::Display for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "<{} {}: {}>", K::NAME, self.path, name),
            None => write!(f, "<{} {}>", K::NAME, self.path),
        }
    }
}
