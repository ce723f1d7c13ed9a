//! Tree rendering CLI command.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use foldview_cache::CacheManager;
use foldview_core::NodeId;
use foldview_core::config::AppConfig;
use foldview_core::error::AppError;
use foldview_core::traits::{ItemStore, NestedTreeStore, StructureClock};
use foldview_entity::output::{OutputNode, ParentRef};
use foldview_entity::permission::PermissionContext;
use foldview_service::{TreeRequest, TreeService};
use foldview_store::TreeSnapshot;
use foldview_store::postgres::{DatabasePool, PgItemStore, PgNestedTree, PgStructureClock};

/// Arguments for the render command
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Session dump (JSON) holding the user's access sets
    #[arg(short, long)]
    pub session: PathBuf,

    /// Tree snapshot (JSON); the configured database is used when omitted
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Session key the result is cached under
    #[arg(long, default_value = "cli")]
    pub session_id: String,

    /// Only list the children of this folder (0 for the top level)
    #[arg(short, long)]
    pub node: Option<NodeId>,

    /// Rebuild even if a cached tree is fresh
    #[arg(long)]
    pub force: bool,
}

/// Tree display row
#[derive(Debug, Serialize, Tabled)]
struct TreeRow {
    /// Folder ID
    id: NodeId,
    /// Title, indented by depth
    title: String,
    /// Parent
    parent: String,
    /// Category
    category: String,
    /// Badge
    badge: String,
    /// Flags
    flags: String,
}

/// Execute the render command
pub async fn execute(
    args: &RenderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&args.session).await?)?;
    let ctx = PermissionContext::from_session(&session, &config.tree);

    let (tree, items, clock) = open_stores(args, config).await?;
    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    let service = TreeService::new(tree, items, clock, cache, &config.tree);

    let mut request = match args.node {
        Some(node_id) => TreeRequest::children(&args.session_id, node_id),
        None => TreeRequest::full(&args.session_id),
    };
    request.force_refresh = args.force;

    let load = service.load_tree(&request, &ctx).await?;

    match format {
        OutputFormat::Table => output::print_list(&rows(&load.nodes), format),
        OutputFormat::Json => output::print_item(&load.nodes, format),
    }
    Ok(())
}

async fn open_stores(
    args: &RenderArgs,
    config: &AppConfig,
) -> Result<
    (
        Arc<dyn NestedTreeStore>,
        Arc<dyn ItemStore>,
        Arc<dyn StructureClock>,
    ),
    AppError,
> {
    match &args.snapshot {
        Some(path) => {
            let (tree, items, clock) = TreeSnapshot::load(path).await?.into_stores();
            Ok((Arc::new(tree), Arc::new(items), Arc::new(clock)))
        }
        None => {
            let db = DatabasePool::connect(&config.database).await?;
            Ok((
                Arc::new(PgNestedTree::new(db.clone())),
                Arc::new(PgItemStore::new(db.clone())),
                Arc::new(PgStructureClock::new(db)),
            ))
        }
    }
}

fn rows(nodes: &[OutputNode]) -> Vec<TreeRow> {
    let mut depth: HashMap<NodeId, usize> = HashMap::new();
    nodes
        .iter()
        .map(|node| {
            let level = match node.parent {
                ParentRef::Root => 0,
                ParentRef::Node(parent) => depth.get(&parent).map_or(0, |d| d + 1),
            };
            depth.insert(node.id, level);

            TreeRow {
                id: node.id,
                title: format!("{}{}", "  ".repeat(level), node.label.title),
                parent: node
                    .parent
                    .node_id()
                    .map_or_else(|| "root".to_string(), |id| id.to_string()),
                category: format!("{:?}", node.category),
                badge: badge(node),
                flags: flags(node),
            }
        })
        .collect()
}

fn badge(node: &OutputNode) -> String {
    let own = node
        .label
        .badge_count
        .map_or_else(|| "-".to_string(), |n| n.to_string());
    match (node.label.descendant_badge_count, node.label.descendant_folder_count) {
        (Some(items), Some(folders)) => format!("{own} ({items}/{folders})"),
        _ => own,
    }
}

fn flags(node: &OutputNode) -> String {
    let mut flags = Vec::new();
    if node.label.is_personal {
        flags.push("personal");
    }
    if node.label.is_read_only {
        flags.push("read-only");
    }
    if node.label.is_blocked {
        flags.push("blocked");
    }
    if node.label.eye_badge {
        flags.push("eye");
    }
    if node.restricted {
        flags.push("restricted");
    }
    if node.can_edit {
        flags.push("editable");
    }
    flags.join(",")
}
