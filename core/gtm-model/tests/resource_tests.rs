use gtm_model::{
    AccountKind, ContainerKind, FolderKind, ModelError, Parameter, PermissionKind, Resource,
    TagKind, VariableKind, VersionHeaderKind, WorkspaceKind,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const WORKSPACE: &str = "accounts/1/containers/2/workspaces/3";

fn tag_json() -> serde_json::Value {
    json!({
        "accountId": "1",
        "containerId": "2",
        "workspaceId": "3",
        "tagId": "4",
        "name": "Tag 1",
        "type": "html",
        "fingerprint": "1570000000000",
        "firingTriggerId": ["2147479553", "7"],
        "paused": true,
        "parameter": [
            {"type": "template", "key": "html", "value": "<script></script>"},
            {"type": "boolean", "key": "supportDocumentWrite", "value": "false"}
        ]
    })
}

// ── Path derivation ──────────────────────────────────────────────

#[test]
fn path_from_representation_wins() {
    let mut raw = tag_json();
    raw["path"] = json!("accounts/1/containers/2/workspaces/3/tags/4");

    let tag = Resource::<TagKind>::from_representation(raw, Some("ignored/parent")).unwrap();
    assert_eq!(tag.path(), "accounts/1/containers/2/workspaces/3/tags/4");
}

#[test]
fn path_synthesized_from_parent_and_id() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();
    assert_eq!(tag.path(), "accounts/1/containers/2/workspaces/3/tags/4");
}

#[test]
fn empty_path_field_counts_as_absent() {
    let raw = json!({"folderId": "9", "name": "F", "path": ""});
    let folder = Resource::<FolderKind>::from_representation(raw, Some(WORKSPACE)).unwrap();
    assert_eq!(folder.path(), "accounts/1/containers/2/workspaces/3/folders/9");
}

#[test]
fn missing_path_and_parent_is_validation_error() {
    let err = Resource::<TagKind>::from_representation(tag_json(), None).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn missing_id_cannot_synthesize_path() {
    let raw = json!({"name": "no id"});
    let err = Resource::<TagKind>::from_representation(raw, Some(WORKSPACE)).unwrap_err();
    assert!(matches!(
        err,
        ModelError::MissingField { kind: "tag", field: "tagId" }
    ));
}

#[test]
fn non_object_representation_rejected() {
    let err = Resource::<WorkspaceKind>::from_representation(json!([1, 2]), Some("x")).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn non_sequence_parameter_rejected() {
    let mut raw = tag_json();
    raw["parameter"] = json!("oops");
    let err = Resource::<TagKind>::from_representation(raw, Some(WORKSPACE)).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn rehomed_ignores_representation_path() {
    let mut raw = tag_json();
    raw["path"] = json!("accounts/1/containers/2/versions/0/tags/4");

    let tag = Resource::<TagKind>::rehomed(raw, WORKSPACE).unwrap();
    assert_eq!(tag.path(), "accounts/1/containers/2/workspaces/3/tags/4");
}

#[test]
fn parent_path_strips_collection_and_id() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();
    assert_eq!(tag.parent_path(), Some(WORKSPACE));

    let account =
        Resource::<AccountKind>::from_representation(json!({"path": "accounts/1"}), None).unwrap();
    assert_eq!(account.parent_path(), None);
}

// ── Field access ─────────────────────────────────────────────────

#[test]
fn common_accessors() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();

    assert_eq!(tag.id(), Some("4"));
    assert_eq!(tag.name(), Some("Tag 1"));
    assert_eq!(tag.entity_type(), Some("html"));
    assert_eq!(tag.fingerprint(), Some("1570000000000"));
    assert_eq!(tag.account_id(), Some("1"));
    assert_eq!(tag.container_id(), Some("2"));
    assert_eq!(tag.workspace_id(), Some("3"));
    assert_eq!(tag.notes(), None);
    assert_eq!(tag.firing_trigger_ids(), vec!["2147479553", "7"]);
    assert!(tag.blocking_trigger_ids().is_empty());
    assert!(tag.paused());
}

#[test]
fn parameters_are_parsed_and_removed_from_fields() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();

    assert_eq!(tag.parameters().len(), 2);
    assert!(tag.field("parameter").is_none());
    assert_eq!(
        tag.parameter("html").and_then(|p| p.value.as_deref()),
        Some("<script></script>")
    );
    assert_eq!(tag.parameter_map().len(), 2);
}

#[test]
fn kinds_without_parameters_keep_raw_field() {
    let raw = json!({"folderId": "1", "name": "F", "parameter": "whatever"});
    let folder = Resource::<FolderKind>::from_representation(raw, Some(WORKSPACE)).unwrap();
    assert!(folder.parameters().is_empty());
    assert_eq!(folder.str_field("parameter"), Some("whatever"));
}

#[test]
fn container_accessors() {
    let raw = json!({
        "path": "accounts/1/containers/2",
        "containerId": "2",
        "publicId": "GTM-ABC123",
        "usageContext": ["web"],
        "domainName": ["example.com", "example.org"]
    });
    let container = Resource::<ContainerKind>::from_representation(raw, None).unwrap();
    assert_eq!(container.public_id(), Some("GTM-ABC123"));
    assert_eq!(container.usage_context(), vec!["web"]);
    assert_eq!(container.domain_names(), vec!["example.com", "example.org"]);
}

#[test]
fn permission_uses_path_segment_as_id_and_email_as_name() {
    let raw = json!({
        "path": "accounts/1/user_permissions/55",
        "accountId": "1",
        "emailAddress": "someone@example.com",
        "accountAccess": {"permission": "admin"},
        "containerAccess": [
            {"containerId": "2", "permission": "publish"},
            {"bogus": true}
        ]
    });
    let permission = Resource::<PermissionKind>::from_representation(raw, None).unwrap();

    assert_eq!(permission.id(), Some("55"));
    assert_eq!(permission.name(), Some("someone@example.com"));
    assert_eq!(permission.account_access(), Some("admin"));
    let access = permission.container_access();
    assert_eq!(access.len(), 1);
    assert_eq!(access[0].container_id, "2");
    assert_eq!(access[0].permission, "publish");
}

#[test]
fn version_header_counters_accept_strings_and_numbers() {
    let raw = json!({
        "path": "accounts/1/containers/2/versions/5",
        "containerVersionId": "5",
        "numTags": "3",
        "numTriggers": 2,
        "deleted": false
    });
    let header = Resource::<VersionHeaderKind>::from_representation(raw, None).unwrap();
    assert_eq!(header.num_tags(), 3);
    assert_eq!(header.num_triggers(), 2);
    assert_eq!(header.num_variables(), 0);
    assert!(!header.deleted());
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn constant_value_reads_the_first_parameter_of_constants_only() {
    let constant = Resource::<VariableKind>::from_representation(
        json!({
            "variableId": "8",
            "name": "DL version",
            "type": "c",
            "parameter": [{"type": "template", "key": "value", "value": "2.1"}]
        }),
        Some(WORKSPACE),
    )
    .unwrap();
    assert_eq!(constant.constant_value(), Some("2.1"));

    let data_layer = Resource::<VariableKind>::from_representation(
        json!({
            "variableId": "9",
            "name": "Page category",
            "type": "v",
            "parameter": [{"type": "template", "key": "name", "value": "category"}]
        }),
        Some(WORKSPACE),
    )
    .unwrap();
    assert_eq!(data_layer.constant_value(), None);

    let empty = Resource::<VariableKind>::from_representation(
        json!({"variableId": "10", "name": "Blank", "type": "c"}),
        Some(WORKSPACE),
    )
    .unwrap();
    assert_eq!(empty.constant_value(), None);
}

#[test]
fn to_value_restores_path_and_parameters() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();
    let value = tag.to_value().unwrap();

    assert_eq!(value["path"], json!("accounts/1/containers/2/workspaces/3/tags/4"));
    assert_eq!(value["parameter"], tag_json()["parameter"]);

    let again = Resource::<TagKind>::from_representation(value, None).unwrap();
    assert_eq!(again, tag);
}

#[test]
fn display_includes_kind_path_and_name() {
    let folder = Resource::<FolderKind>::from_representation(
        json!({"folderId": "1", "name": "Marketing"}),
        Some(WORKSPACE),
    )
    .unwrap();
    assert_eq!(
        folder.to_string(),
        "<folder accounts/1/containers/2/workspaces/3/folders/1: Marketing>"
    );
}

#[test]
fn parameter_order_is_preserved() {
    let tag = Resource::<TagKind>::from_representation(tag_json(), Some(WORKSPACE)).unwrap();
    let keys: Vec<&str> = tag.parameters().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["html", "supportDocumentWrite"]);
    assert_eq!(tag.parameters()[1], Parameter::boolean("supportDocumentWrite", false));
}
