//! Whole-object update requests.
//!
//! The remote API only accepts full replacement. A [`ResourceUpdate`]
//! describes what the caller wants to change; the outgoing body is built by
//! [`Resource::update_body`](crate::Resource::update_body) from the current
//! state plus these overrides.

use crate::error::{ModelError, ModelResult};
use crate::parameter::Parameter;
use serde_json::{Map, Value};

/// Field and parameter overrides for one update call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceUpdate {
    fields: Map<String, Value>,
    parameters: Option<Vec<Parameter>>,
    refresh: bool,
}

impl ResourceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides one top-level field. Caller-supplied values win over the
    /// current state.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets the parameters merged onto the current parameter tree by key.
    pub fn parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Adds a single parameter override.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.get_or_insert_with(Vec::new).push(parameter);
        self
    }

    /// Reloads the resource before building the body, so stale local fields
    /// are not written back.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Builds an update from a JSON object. A `parameter` member, if
    /// present, must be an array and becomes the parameter overrides.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(ModelError::Validation(
                "update overrides must be a JSON object".to_string(),
            ));
        };

        let parameters = match fields.remove("parameter") {
            Some(raw) => Some(Parameter::parse_list(&raw)?),
            None => None,
        };

        Ok(Self {
            fields,
            parameters,
            refresh: false,
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn override_parameters(&self) -> Option<&[Parameter]> {
        self.parameters.as_deref()
    }

    pub fn is_refresh(&self) -> bool {
        self.refresh
    }
}

/// Whether a value is dropped from an outgoing update body.
///
/// Explicit `false` and `0` count as empty too, so they are indistinguishable
/// from "not overridden".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
