//! Parameter trees.
//!
//! Tags, triggers and variables carry their configuration as an ordered
//! sequence of [`Parameter`] nodes. A node is either a typed leaf holding a
//! string `value`, or a `list`/`map` node holding nested nodes.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The type tag of a parameter node, serialized as the wire `type` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Boolean,
    Integer,
    Template,
    List,
    Map,
    TriggerReference,
    TagReference,
    #[default]
    TypeUnspecified,
    /// A type string this crate does not know about. Kept verbatim so it
    /// survives an update round trip.
    Other(String),
}

impl ParameterType {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Template => "template",
            Self::List => "list",
            Self::Map => "map",
            Self::TriggerReference => "triggerReference",
            Self::TagReference => "tagReference",
            Self::TypeUnspecified => "typeUnspecified",
            Self::Other(s) => s,
        }
    }

    /// Whether nodes of this type hold children instead of a value.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Map)
    }

    fn is_unspecified(&self) -> bool {
        matches!(self, Self::TypeUnspecified)
    }
}

impl From<&str> for ParameterType {
    fn from(s: &str) -> Self {
        match s {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "template" => Self::Template,
            "list" => Self::List,
            "map" => Self::Map,
            "triggerReference" => Self::TriggerReference,
            "tagReference" => Self::TagReference,
            "typeUnspecified" => Self::TypeUnspecified,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParameterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParameterType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// One node of a parameter tree.
///
/// Empty fields are omitted from the wire form, so a node with an empty
/// `list` serializes exactly like a node without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type", default, skip_serializing_if = "ParameterType::is_unspecified")]
    pub kind: ParameterType,
    /// Merge key. Entries of a `list` are usually unkeyed maps.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map: Vec<Parameter>,
}

impl Parameter {
    fn leaf(kind: ParameterType, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// A `template` leaf (free text, may contain `{{variable}}` references).
    pub fn template(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(ParameterType::Template, key, value)
    }

    /// A `boolean` leaf, stored as `"true"`/`"false"`.
    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self::leaf(ParameterType::Boolean, key, value.to_string())
    }

    /// An `integer` leaf.
    pub fn integer(key: impl Into<String>, value: i64) -> Self {
        Self::leaf(ParameterType::Integer, key, value.to_string())
    }

    /// A leaf referencing a trigger by id.
    pub fn trigger_reference(key: impl Into<String>, trigger_id: impl Into<String>) -> Self {
        Self::leaf(ParameterType::TriggerReference, key, trigger_id)
    }

    /// A leaf referencing a tag by name.
    pub fn tag_reference(key: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self::leaf(ParameterType::TagReference, key, tag_name)
    }

    /// A `list` node.
    pub fn list(key: impl Into<String>, items: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::List,
            key: key.into(),
            list: items,
            ..Default::default()
        }
    }

    /// A keyed `map` node.
    pub fn map(key: impl Into<String>, entries: Vec<Parameter>) -> Self {
        Self {
            kind: ParameterType::Map,
            key: key.into(),
            map: entries,
            ..Default::default()
        }
    }

    /// An unkeyed `map` node, the usual shape of a `list` element.
    pub fn map_item(entries: Vec<Parameter>) -> Self {
        Self::map(String::new(), entries)
    }

    /// Returns the nested nodes of a `list` or `map` node, empty for leaves.
    pub fn children(&self) -> &[Parameter] {
        match self.kind {
            ParameterType::List => &self.list,
            ParameterType::Map => &self.map,
            _ if !self.list.is_empty() => &self.list,
            _ => &self.map,
        }
    }

    /// Whether this node carries a value rather than children.
    pub fn is_leaf(&self) -> bool {
        self.list.is_empty() && self.map.is_empty()
    }

    /// Finds a direct child by key.
    pub fn child(&self, key: &str) -> Option<&Parameter> {
        self.children().iter().find(|p| p.key == key)
    }

    /// Interprets the value of a `boolean` leaf.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Serializes this node (and its subtree) into its wire form.
    pub fn to_value(&self) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses a node from its wire form.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parses a `parameter` field. Anything other than a JSON array is a
    /// validation error.
    pub fn parse_list(value: &Value) -> ModelResult<Vec<Parameter>> {
        match value {
            Value::Array(items) => items
                .iter()
                .cloned()
                .map(Self::from_value)
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(ModelError::Validation(format!(
                "'parameter' has to be a list of parameters, got {other}"
            ))),
        }
    }

    /// Serializes a parameter sequence into a JSON array.
    pub fn list_to_value(parameters: &[Parameter]) -> ModelResult<Value> {
        Ok(serde_json::to_value(parameters)?)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Parameter {} ({})>", self.key, self.kind)
    }
}
