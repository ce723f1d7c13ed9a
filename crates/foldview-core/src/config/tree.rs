//! Tree rendering configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape how a user's folder tree is built.
///
/// The feature switches here are deployment-wide; the per-user access sets
/// live in the session and reach the builder as a permission context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Upper bound on the number of nodes visited by one full build.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Deepest nesting level the full build descends into.
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    /// Lifetime of a cached tree in the session store, in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Whether personal folders are enabled for this deployment.
    #[serde(default = "default_true")]
    pub personal_folders_enabled: bool,
    /// Whether rolled-up descendant counters are shown next to folders.
    #[serde(default)]
    pub tree_counters: bool,
    /// Hide folders that give no access and lead to nothing accessible.
    #[serde(default)]
    pub show_only_accessible_folders: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_depth: default_max_depth(),
            session_ttl_seconds: default_session_ttl(),
            personal_folders_enabled: default_true(),
            tree_counters: false,
            show_only_accessible_folders: false,
        }
    }
}

fn default_max_nodes() -> usize {
    50_000
}

fn default_max_depth() -> i32 {
    64
}

fn default_session_ttl() -> u64 {
    86_400
}

fn default_true() -> bool {
    true
}
