//! Folder tree builder.
//!
//! Both modes start from one [`SubtreeIndex`] load: a single descendant
//! query plus one batched item count. The full build then walks the index
//! depth-first with an explicit stack. Each folder goes through the phases
//! `Visit` (look up), `Classify`, `Emit` (place and output), `Descend`
//! (schedule children) and `Backtrack`, so the output is produced in
//! pre-order and a parent always precedes its children. The incremental
//! build lists the direct children of one folder for lazy expansion.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use foldview_auth::acl::NodeClassifier;
use foldview_core::config::tree::TreeConfig;
use foldview_core::result::AppResult;
use foldview_core::traits::item_store::ItemStore;
use foldview_core::traits::tree_store::NestedTreeStore;
use foldview_core::{NodeId, ROOT_NODE_ID, TreeNode};
use foldview_entity::classification::{Category, Classification};
use foldview_entity::output::{DisplayLabel, OutputNode, ParentRef};
use foldview_entity::permission::PermissionContext;

use super::collapser::CollapseState;
use super::counter::{ItemCounter, LabelCounts};
use super::invariant::verify_parent_refs;
use super::subtree::SubtreeIndex;

/// A folder scheduled for a visit.
#[derive(Debug, Clone, Copy)]
struct Frame {
    id: NodeId,
    /// Collapse state inherited from the parent.
    state: CollapseState,
    /// Inside an excluded subtree: only override grants are emitted.
    suppressed: bool,
}

/// A looked-up folder with its child ids.
#[derive(Debug)]
struct Visited<'i> {
    frame: Frame,
    node: &'i TreeNode,
    children: &'i [NodeId],
}

#[derive(Debug)]
enum Phase<'i> {
    Visit(Frame),
    Classify(Visited<'i>),
    Emit(Visited<'i>, Classification),
    Descend {
        visited: Visited<'i>,
        child_state: CollapseState,
        suppressed: bool,
    },
    Backtrack(NodeId),
}

/// Builds per-user folder trees from the nested-set store.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    /// Nested-set tree store.
    tree: Arc<dyn NestedTreeStore>,
    /// Item counter.
    counter: ItemCounter,
    /// Upper bound on folders visited by one full build.
    max_nodes: usize,
    /// Deepest level the full build descends into.
    max_depth: i32,
}

impl TreeBuilder {
    /// Creates a new tree builder.
    pub fn new(
        tree: Arc<dyn NestedTreeStore>,
        items: Arc<dyn ItemStore>,
        config: &TreeConfig,
    ) -> Self {
        Self {
            tree,
            counter: ItemCounter::new(items),
            max_nodes: config.max_nodes,
            max_depth: config.max_depth,
        }
    }

    /// Builds the whole tree visible to the user, in pre-order.
    pub async fn build_full(&self, ctx: &PermissionContext) -> AppResult<Vec<OutputNode>> {
        let classifier = NodeClassifier::new(ctx);
        let index = SubtreeIndex::load(self.tree.as_ref(), &self.counter, ctx, ROOT_NODE_ID).await?;
        let mut out: Vec<OutputNode> = Vec::new();
        let mut visited_count = 0usize;
        let mut truncated = false;

        let mut stack: Vec<Phase<'_>> = index
            .children(ROOT_NODE_ID)
            .iter()
            .rev()
            .map(|&id| {
                Phase::Visit(Frame {
                    id,
                    state: CollapseState::root(),
                    suppressed: false,
                })
            })
            .collect();

        while let Some(phase) = stack.pop() {
            match phase {
                Phase::Visit(frame) => {
                    if visited_count >= self.max_nodes {
                        warn!(
                            max_nodes = self.max_nodes,
                            emitted = out.len(),
                            "Folder tree exceeds node limit, returning partial tree"
                        );
                        truncated = true;
                        break;
                    }
                    visited_count += 1;

                    let Some(node) = index.node(frame.id) else {
                        debug!(folder_id = frame.id, "Folder missing from the loaded subtree, skipping");
                        continue;
                    };
                    stack.push(Phase::Classify(Visited {
                        frame,
                        node,
                        children: index.children(node.id),
                    }));
                }
                Phase::Classify(visited) => {
                    let accessible_below = index.summary(visited.node.id).accessible_below;
                    let classification = classifier.classify(visited.node, accessible_below);
                    stack.push(Phase::Emit(visited, classification));
                }
                Phase::Emit(visited, classification) => {
                    let category = classification.category;
                    let emitted = if visited.frame.suppressed {
                        category.is_override()
                    } else {
                        category.is_emitted()
                    };

                    let placement = visited.frame.state.visit(visited.node, emitted);
                    if emitted {
                        out.push(output_node(
                            &classifier,
                            &index,
                            visited.node,
                            &classification,
                            placement.parent,
                            !visited.children.is_empty(),
                        ));
                    }

                    stack.push(Phase::Descend {
                        suppressed: visited.frame.suppressed || category == Category::Excluded,
                        visited,
                        child_state: placement.child_state,
                    });
                }
                Phase::Descend {
                    visited,
                    child_state,
                    suppressed,
                } => {
                    if visited.children.is_empty() {
                        continue;
                    }
                    if visited.node.nlevel >= self.max_depth {
                        warn!(
                            folder_id = visited.node.id,
                            max_depth = self.max_depth,
                            "Folder tree exceeds depth limit, not descending"
                        );
                        continue;
                    }
                    stack.push(Phase::Backtrack(visited.node.id));
                    stack.extend(visited.children.iter().rev().map(|&id| {
                        Phase::Visit(Frame {
                            id,
                            state: child_state,
                            suppressed,
                        })
                    }));
                }
                Phase::Backtrack(id) => {
                    trace!(folder_id = id, "Finished subtree");
                }
            }
        }

        debug_assert!(verify_parent_refs(&out, None).is_ok());
        debug!(
            visited = visited_count,
            emitted = out.len(),
            truncated,
            "Built full folder tree"
        );
        Ok(out)
    }

    /// Lists the direct children of `node_id` (`0` for the top level).
    ///
    /// No collapsing happens here: children attach to the requested folder,
    /// which the caller already displays. A child is listed when the user
    /// holds a grant on it or it is a declared no-access placeholder.
    pub async fn build_children(
        &self,
        node_id: NodeId,
        ctx: &PermissionContext,
    ) -> AppResult<Vec<OutputNode>> {
        let classifier = NodeClassifier::new(ctx);

        if node_id != ROOT_NODE_ID {
            let Some(node) = self.tree.get_node(node_id).await? else {
                debug!(folder_id = node_id, "Requested folder not found");
                return Ok(Vec::new());
            };
            if classifier.classify(&node, false).category == Category::Excluded {
                debug!(folder_id = node_id, "Requested folder is excluded");
                return Ok(Vec::new());
            }
        }

        let child_ids = self.tree.get_children(node_id).await?;
        let index = SubtreeIndex::load(self.tree.as_ref(), &self.counter, ctx, node_id).await?;
        let parent = ParentRef::from_parent_id(node_id);
        let mut out = Vec::new();
        for child_id in child_ids {
            let Some(child) = index.node(child_id) else {
                debug!(folder_id = child_id, "Listed child folder not found, skipping");
                continue;
            };

            let classification = classifier.classify(child, index.summary(child_id).accessible_below);
            let category = classification.category;
            let listed = category.is_override()
                || (category.is_emitted() && ctx.no_access_folders.contains(&child_id));
            if !listed {
                continue;
            }

            out.push(output_node(
                &classifier,
                &index,
                child,
                &classification,
                parent,
                !index.children(child_id).is_empty(),
            ));
        }

        debug_assert!(verify_parent_refs(&out, Some(node_id)).is_ok());
        debug!(folder_id = node_id, emitted = out.len(), "Built folder children");
        Ok(out)
    }
}

fn output_node(
    classifier: &NodeClassifier<'_>,
    index: &SubtreeIndex,
    node: &TreeNode,
    classification: &Classification,
    parent: ParentRef,
    has_children: bool,
) -> OutputNode {
    let ctx = classifier.context();
    let p = classifier.presentation(node.id, classification);
    let counts = LabelCounts::for_folder(index, node.id, classification, ctx);

    OutputNode {
        id: node.id,
        parent,
        category: classification.category,
        label: DisplayLabel {
            title: classification.display_title.clone(),
            is_personal: classification.is_personal_folder,
            is_read_only: p.is_read_only,
            is_blocked: p.is_blocked,
            eye_badge: classification.eye_badge,
            badge_count: counts.badge_count,
            descendant_badge_count: counts.descendant_badge_count,
            descendant_folder_count: counts.descendant_folder_count,
        },
        restricted: p.restricted,
        folder_class: p.folder_class,
        can_edit: p.can_edit,
        in_personal_folders: p.in_personal_folders,
        has_children,
        icon: node.icon.clone(),
        icon_selected: node.icon_selected.clone(),
        hint: p.hint,
    }
}
