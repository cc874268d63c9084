//! Resource-kind descriptors.
//!
//! Every remote resource type shares one shape; what differs is where it
//! lives in the path hierarchy, which field holds its id, and which fields
//! are sent back on a whole-object update. [`ResourceKind`] captures exactly
//! that, and [`Resource`](crate::Resource) is generic over it.

use std::fmt::Debug;

/// Static description of one remote resource type.
pub trait ResourceKind: Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static {
    /// Kind name used in errors and logs.
    const NAME: &'static str;
    /// Path segment under the parent resource, e.g. `tags`.
    const COLLECTION: &'static str;
    /// Path segment used to list the collection. Differs from
    /// [`Self::COLLECTION`] only for version headers.
    const LIST_COLLECTION: &'static str = Self::COLLECTION;
    /// Field of a list response holding the items, e.g. `tag`.
    const LIST_FIELD: &'static str;
    /// Field holding the resource id. Empty when the kind has no id field
    /// and is only ever addressed by its path.
    const ID_FIELD: &'static str;
    /// Field holding the display name used by name lookups.
    const NAME_FIELD: &'static str = "name";
    /// Fields carried over from the current state into an update body.
    const UPDATE_FIELDS: &'static [&'static str];
    /// Whether the kind owns a `parameter` tree.
    const HAS_PARAMETERS: bool = false;
}

macro_rules! resource_kind {
    (
        $(#[$meta:meta])*
        $name:ident {
            name: $kind:literal,
            collection: $collection:literal,
            $(list_collection: $list_collection:literal,)?
            list_field: $list_field:literal,
            id_field: $id_field:literal,
            $(name_field: $name_field:literal,)?
            update_fields: [$($field:literal),* $(,)?],
            $(has_parameters: $has_parameters:literal,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl ResourceKind for $name {
            const NAME: &'static str = $kind;
            const COLLECTION: &'static str = $collection;
            $(const LIST_COLLECTION: &'static str = $list_collection;)?
            const LIST_FIELD: &'static str = $list_field;
            const ID_FIELD: &'static str = $id_field;
            $(const NAME_FIELD: &'static str = $name_field;)?
            const UPDATE_FIELDS: &'static [&'static str] = &[$($field),*];
            $(const HAS_PARAMETERS: bool = $has_parameters;)?
        }
    };
}

resource_kind! {
    /// A Tag Manager account (`accounts/{accountId}`).
    AccountKind {
        name: "account",
        collection: "accounts",
        list_field: "account",
        id_field: "accountId",
        update_fields: ["name", "shareData"],
    }
}

resource_kind! {
    /// A container inside an account.
    ContainerKind {
        name: "container",
        collection: "containers",
        list_field: "container",
        id_field: "containerId",
        update_fields: ["name", "domainName", "notes", "usageContext"],
    }
}

resource_kind! {
    /// A workspace inside a container.
    WorkspaceKind {
        name: "workspace",
        collection: "workspaces",
        list_field: "workspace",
        id_field: "workspaceId",
        update_fields: ["name", "description"],
    }
}

resource_kind! {
    /// A tag inside a workspace.
    TagKind {
        name: "tag",
        collection: "tags",
        list_field: "tag",
        id_field: "tagId",
        update_fields: [
            "paused",
            "setupTag",
            "firingRuleId",
            "teardownTag",
            "priority",
            "parentFolderId",
            "scheduleStartMs",
            "scheduleEndMs",
            "tagFiringOption",
            "blockingRuleId",
            "firingTriggerId",
            "name",
            "type",
            "notes",
            "liveOnly",
            "blockingTriggerId",
            "monitoringMetadata",
            "consentSettings",
        ],
        has_parameters: true,
    }
}

resource_kind! {
    /// A trigger inside a workspace.
    TriggerKind {
        name: "trigger",
        collection: "triggers",
        list_field: "trigger",
        id_field: "triggerId",
        update_fields: [
            "maxTimerLengthSeconds",
            "totalTimeMinMilliseconds",
            "uniqueTriggerId",
            "verticalScrollPercentageList",
            "horizontalScrollPercentageList",
            "containerId",
            "waitForTagsTimeout",
            "accountId",
            "waitForTags",
            "intervalSeconds",
            "eventName",
            "visibilitySelector",
            "workspaceId",
            "customEventFilter",
            "parentFolderId",
            "continuousTimeMinMilliseconds",
            "selector",
            "triggerId",
            "tagManagerUrl",
            "fingerprint",
            "visiblePercentageMax",
            "path",
            "name",
            "visiblePercentageMin",
            "type",
            "notes",
            "interval",
            "filter",
            "autoEventFilter",
            "limit",
            "checkValidation",
        ],
        has_parameters: true,
    }
}

resource_kind! {
    /// A user-defined variable inside a workspace.
    VariableKind {
        name: "variable",
        collection: "variables",
        list_field: "variable",
        id_field: "variableId",
        update_fields: [
            "scheduleStartMs",
            "scheduleEndMs",
            "name",
            "variableId",
            "type",
            "notes",
            "enablingTriggerId",
            "workspaceId",
            "tagManagerUrl",
            "fingerprint",
            "path",
            "accountId",
            "parentFolderId",
            "disablingTriggerId",
            "containerId",
            "formatValue",
        ],
        has_parameters: true,
    }
}

resource_kind! {
    /// A folder inside a workspace.
    FolderKind {
        name: "folder",
        collection: "folders",
        list_field: "folder",
        id_field: "folderId",
        update_fields: ["name", "notes"],
    }
}

resource_kind! {
    /// A user permission on an account. Permissions carry no id field.
    PermissionKind {
        name: "permission",
        collection: "user_permissions",
        list_field: "userPermission",
        id_field: "",
        name_field: "emailAddress",
        update_fields: ["emailAddress", "accountAccess", "containerAccess"],
    }
}

resource_kind! {
    /// An enabled built-in variable, identified by its `type`.
    BuiltInVariableKind {
        name: "built-in variable",
        collection: "built_in_variables",
        list_field: "builtInVariable",
        id_field: "type",
        update_fields: [],
    }
}

resource_kind! {
    /// A container version (`.../versions/{containerVersionId}`).
    VersionKind {
        name: "version",
        collection: "versions",
        list_field: "containerVersion",
        id_field: "containerVersionId",
        update_fields: ["name", "description"],
    }
}

resource_kind! {
    /// The summary header of a container version.
    VersionHeaderKind {
        name: "version header",
        collection: "versions",
        list_collection: "version_headers",
        list_field: "containerVersionHeader",
        id_field: "containerVersionId",
        update_fields: [],
    }
}
