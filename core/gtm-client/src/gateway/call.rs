//! The remote resource gateway contract.
//!
//! The resource tree never builds requests itself. It describes each remote
//! call as a [`GatewayCall`] (an operation applied to a resource path) and
//! hands it to a [`Gateway`], which executes it and returns the decoded
//! response or a classified error.

use crate::error::GtmResult;
use async_trait::async_trait;
use serde_json::Value;

/// A remote operation on one resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get,
    /// Lists `collection` under the path. The items of every page are
    /// returned together under `item_field`.
    List {
        collection: &'static str,
        item_field: &'static str,
    },
    /// Creates a resource in `collection` under the path.
    Create { collection: &'static str },
    Update,
    Delete,
    Publish,
    Sync,
    GetStatus,
    QuickPreview,
    CreateVersion,
    /// Reads the published version of the container at the path.
    LiveVersion,
    CreateBuiltIns,
    DeleteBuiltIns,
}

impl Operation {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::List { .. } => "list",
            Operation::Create { .. } => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Publish => "publish",
            Operation::Sync => "sync",
            Operation::GetStatus => "getStatus",
            Operation::QuickPreview => "quickPreview",
            Operation::CreateVersion => "createVersion",
            Operation::LiveVersion => "live",
            Operation::CreateBuiltIns => "builtInVariables.create",
            Operation::DeleteBuiltIns => "builtInVariables.delete",
        }
    }
}

/// One call handed to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    pub operation: Operation,
    /// Resource path (the parent path for `List` and `Create`). Empty for
    /// root collections.
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl GatewayCall {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Operation::Get, path)
    }

    pub fn list(
        parent: impl Into<String>,
        collection: &'static str,
        item_field: &'static str,
    ) -> Self {
        Self::new(
            Operation::List {
                collection,
                item_field,
            },
            parent,
        )
    }

    pub fn create(parent: impl Into<String>, collection: &'static str, body: Value) -> Self {
        Self::new(Operation::Create { collection }, parent).with_body(body)
    }

    pub fn update(path: impl Into<String>, body: Value) -> Self {
        Self::new(Operation::Update, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Operation::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Executes remote calls.
///
/// Implementations own authentication, retries and rate limiting. The
/// resource tree awaits one call at a time and never retries on its own.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Executes the call and returns the decoded response body (`null` for
    /// empty responses).
    async fn execute(&self, call: GatewayCall) -> GtmResult<Value>;
}
