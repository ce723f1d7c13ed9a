//! Per-request permission context.
//!
//! The context bundles every access-control set the classifier consults.
//! It is built once per request from session state, never mutated during a
//! build, and dropped afterwards.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use foldview_core::NodeId;
use foldview_core::config::tree::TreeConfig;

/// Item identifier inside a limited or restricted folder allow-list.
pub type ItemId = i64;

/// Immutable bundle of the current user's access-control sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    /// Folders the user must not see.
    #[serde(default)]
    pub forbidden_folders: HashSet<NodeId>,
    /// Folders the user has full access to.
    #[serde(default)]
    pub visible_groups: HashSet<NodeId>,
    /// Folders where only the listed items are accessible.
    #[serde(default)]
    pub limited_folders: HashMap<NodeId, HashSet<ItemId>>,
    /// Folders holding items shared with the user individually.
    #[serde(default)]
    pub restricted_folders_for_items: HashMap<NodeId, HashSet<ItemId>>,
    /// Folders listed as placeholders without access.
    #[serde(default)]
    pub no_access_folders: HashSet<NodeId>,
    /// Folders granted with view-only access.
    #[serde(default)]
    pub read_only_folders: HashSet<NodeId>,
    /// The user's own personal folders.
    #[serde(default)]
    pub personal_folders: HashSet<NodeId>,
    /// Visible groups that stay writable for a read-only user.
    #[serde(default)]
    pub personal_visible_groups: HashSet<NodeId>,
    /// Current user id.
    #[serde(default)]
    pub user_id: i64,
    /// Current user login, shown instead of the id on personal folders.
    #[serde(default)]
    pub user_login: String,
    /// Whether the account is read-only.
    #[serde(default)]
    pub is_read_only_user: bool,
    /// Whether the user may create folders at the top level.
    #[serde(default)]
    pub can_create_root_folder: bool,
    /// Hide inaccessible folders and collapse their accessible descendants.
    #[serde(default)]
    pub show_only_accessible_folders: bool,
    /// Show rolled-up descendant counters.
    #[serde(default)]
    pub counters_enabled: bool,
    /// Personal folders feature switch.
    #[serde(default)]
    pub personal_folders_enabled: bool,
}

impl PermissionContext {
    /// Builds a context from a session dump and the deployment settings.
    ///
    /// Session values are read leniently: any field that is missing or not
    /// shaped like a set/mapping of ids is treated as empty.
    pub fn from_session(session: &Value, settings: &TreeConfig) -> Self {
        Self {
            forbidden_folders: id_set(session, "forbidden_folders"),
            visible_groups: id_set(session, "visible_groups"),
            limited_folders: id_map(session, "limited_folders"),
            restricted_folders_for_items: id_map(session, "restricted_folders_for_items"),
            no_access_folders: id_set(session, "no_access_folders"),
            read_only_folders: id_set(session, "read_only_folders"),
            personal_folders: id_set(session, "personal_folders"),
            personal_visible_groups: id_set(session, "personal_visible_groups"),
            user_id: session.get("user_id").and_then(parse_id).unwrap_or_default(),
            user_login: session
                .get("user_login")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_read_only_user: flag(session, "user_read_only"),
            can_create_root_folder: flag(session, "can_create_root_folder"),
            show_only_accessible_folders: settings.show_only_accessible_folders,
            counters_enabled: settings.tree_counters,
            personal_folders_enabled: settings.personal_folders_enabled,
        }
    }

    /// Whether the folder is in the visible groups.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.visible_groups.contains(&id)
    }

    /// Whether the folder is forbidden.
    pub fn is_forbidden(&self, id: NodeId) -> bool {
        self.forbidden_folders.contains(&id)
    }

    /// Allow-list of a limited folder.
    pub fn limited_items(&self, id: NodeId) -> Option<&HashSet<ItemId>> {
        self.limited_folders.get(&id)
    }

    /// Allow-list of a restricted-for-items folder.
    pub fn restricted_items(&self, id: NodeId) -> Option<&HashSet<ItemId>> {
        self.restricted_folders_for_items.get(&id)
    }

    /// Whether any override rule grants the folder independently of the
    /// forbidden list.
    pub fn has_override(&self, id: NodeId) -> bool {
        self.is_visible(id)
            || self.limited_folders.contains_key(&id)
            || self.restricted_folders_for_items.contains_key(&id)
    }

    /// Whether the folder makes its ancestors worth showing.
    pub fn is_accessible_target(&self, id: NodeId) -> bool {
        self.is_visible(id) || self.restricted_folders_for_items.contains_key(&id)
    }
}

/// Parses an id from a JSON number or numeric string.
fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_id_collection(value: &Value) -> Option<HashSet<i64>> {
    match value {
        Value::Array(values) => Some(values.iter().filter_map(parse_id).collect()),
        Value::Object(map) => Some(map.values().filter_map(parse_id).collect()),
        Value::String(s) => Some(
            s.split([';', ','])
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
        ),
        Value::Null => Some(HashSet::new()),
        _ => None,
    }
}

fn id_set(session: &Value, field: &str) -> HashSet<NodeId> {
    let Some(value) = session.get(field) else {
        return HashSet::new();
    };
    parse_id_collection(value).unwrap_or_else(|| {
        debug!(field, "Malformed id set in session, treating as empty");
        HashSet::new()
    })
}

fn id_map(session: &Value, field: &str) -> HashMap<NodeId, HashSet<ItemId>> {
    match session.get(field) {
        None | Some(Value::Null) => HashMap::new(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, items)| {
                let id = key.trim().parse().ok()?;
                Some((id, parse_id_collection(items).unwrap_or_default()))
            })
            .collect(),
        Some(_) => {
            debug!(field, "Malformed folder mapping in session, treating as empty");
            HashMap::new()
        }
    }
}

fn flag(session: &Value, field: &str) -> bool {
    match session.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
