#![allow(dead_code)]

use async_trait::async_trait;
use gtm_client::gtm_model::WorkspaceKind;
use gtm_client::{Entity, Gateway, GatewayCall, GtmError, GtmResult, Operation, Workspace};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ACCOUNT: &str = "accounts/1";
pub const CONTAINER: &str = "accounts/1/containers/2";
pub const WORKSPACE: &str = "accounts/1/containers/2/workspaces/3";

/// Gateway that replays queued responses in order and records every call.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<GtmResult<Value>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, value: Value) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(value));
        self
    }

    pub fn fail(&self, error: GtmError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(operation name, path)` of every recorded call.
    pub fn trace(&self) -> Vec<(&'static str, String)> {
        self.calls()
            .into_iter()
            .map(|c| (c.operation.name(), c.path))
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn execute(&self, call: GatewayCall) -> GtmResult<Value> {
        let description = format!("{} {}", call.operation.name(), call.path);
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted call: {description}"))
    }
}

pub fn as_gateway(script: &Arc<ScriptedGateway>) -> Arc<dyn Gateway> {
    script.clone()
}

// ── Fixtures ─────────────────────────────────────────────────────

pub fn workspace(script: &Arc<ScriptedGateway>) -> Workspace {
    let entity = Entity::<WorkspaceKind>::from_representation(
        as_gateway(script),
        json!({
            "path": WORKSPACE,
            "accountId": "1",
            "containerId": "2",
            "workspaceId": "3",
            "name": "Default Workspace",
            "tagManagerUrl": "https://tagmanager.google.com/#/container/accounts/1/containers/2/workspaces/3"
        }),
        None,
    )
    .unwrap();
    Workspace::new(entity)
}

pub fn tag_json(id: &str, name: &str) -> Value {
    json!({
        "path": format!("{WORKSPACE}/tags/{id}"),
        "accountId": "1",
        "containerId": "2",
        "workspaceId": "3",
        "tagId": id,
        "name": name,
        "type": "html",
        "parameter": [{"type": "template", "key": "html", "value": "<script></script>"}]
    })
}

pub fn trigger_json(id: &str, name: &str) -> Value {
    json!({
        "accountId": "1",
        "containerId": "2",
        "triggerId": id,
        "name": name,
        "type": "pageview"
    })
}

pub fn variable_json(id: &str, name: &str) -> Value {
    json!({
        "accountId": "1",
        "containerId": "2",
        "variableId": id,
        "name": name,
        "type": "v",
        "parameter": [{"type": "integer", "key": "dataLayerVersion", "value": "2"}]
    })
}

pub fn folder_json(id: &str, name: &str) -> Value {
    json!({
        "accountId": "1",
        "containerId": "2",
        "folderId": id,
        "name": name
    })
}

/// A quick-preview response as the remote service returns it: children
/// carry no workspace id and no path.
pub fn preview_response(
    tags: Vec<Value>,
    triggers: Vec<Value>,
    variables: Vec<Value>,
    folders: Vec<Value>,
) -> Value {
    json!({
        "containerVersion": {
            "accountId": "1",
            "containerId": "2",
            "containerVersionId": "0",
            "tag": tags,
            "trigger": triggers,
            "variable": variables,
            "folder": folders
        },
        "compilerError": false
    })
}

pub fn is_operation(call: &GatewayCall, operation: &Operation) -> bool {
    &call.operation == operation
}
