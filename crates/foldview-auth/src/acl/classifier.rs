//! Node classifier: maps a folder and the permission context to a category.
//!
//! Rules are evaluated in order, the first match wins:
//! 0. Another user's personal folder (personal folders enabled): excluded.
//! 1. Forbidden and not granted by any override: excluded.
//! 2. Visible group: read-only folder or read-only user gives `ReadOnly`,
//!    otherwise `Visible`.
//! 3. Limited folder: `LimitedAccess`, badge is the allow-list size.
//! 4. Folder with individually shared items: `RestrictedItems`.
//! 5. Show-only-accessible and nothing accessible below: `HiddenCollapsed`.
//! 6. Otherwise `BlockedVisible`.

use tracing::trace;

use foldview_core::{NodeId, TreeNode};
use foldview_entity::classification::{Category, Classification};
use foldview_entity::output::{FolderClass, NodeHint};
use foldview_entity::permission::PermissionContext;

use super::title::{decode_entities, is_personal_root};

/// Presentation flags derived from a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Whether the folder only exposes a subset of its content.
    pub restricted: bool,
    /// Drag-and-drop style.
    pub folder_class: FolderClass,
    /// Whether the folder is read-only for the user.
    pub is_read_only: bool,
    /// Whether the folder is shown but blocked.
    pub is_blocked: bool,
    /// Tooltip hint.
    pub hint: Option<NodeHint>,
    /// Whether edit actions are offered.
    pub can_edit: bool,
    /// Whether the folder is one of the user's personal folders.
    pub in_personal_folders: bool,
}

/// Classifies folders for one permission context.
#[derive(Debug, Clone, Copy)]
pub struct NodeClassifier<'a> {
    ctx: &'a PermissionContext,
}

impl<'a> NodeClassifier<'a> {
    /// Creates a classifier over a permission context.
    pub fn new(ctx: &'a PermissionContext) -> Self {
        Self { ctx }
    }

    /// The permission context being applied.
    pub fn context(&self) -> &'a PermissionContext {
        self.ctx
    }

    /// Classifies one folder.
    ///
    /// `has_accessible_descendant` (some folder below is in `visible_groups`
    /// or holds individually shared items) is only consulted by the
    /// show-only rules.
    pub fn classify(&self, node: &TreeNode, has_accessible_descendant: bool) -> Classification {
        let ctx = self.ctx;
        let id = node.id;
        let is_personal_folder = is_personal_root(&node.title, node.nlevel, ctx.user_id);
        let display_title = if is_personal_folder {
            ctx.user_login.clone()
        } else {
            decode_entities(&node.title).into_owned()
        };

        let mut allow_list_count = None;
        let mut eye_badge = false;

        let category = if self.is_foreign_personal(node) {
            Category::Excluded
        } else if ctx.is_forbidden(id) && !ctx.has_override(id) {
            Category::Excluded
        } else if ctx.is_visible(id) {
            if ctx.read_only_folders.contains(&id)
                || (ctx.is_read_only_user && !ctx.personal_visible_groups.contains(&id))
            {
                eye_badge = true;
                Category::ReadOnly
            } else {
                Category::Visible
            }
        } else if let Some(items) = ctx.limited_items(id) {
            (allow_list_count, eye_badge) = self.allow_list_badge(items.len());
            Category::LimitedAccess
        } else if let Some(items) = ctx.restricted_items(id) {
            (allow_list_count, eye_badge) = self.allow_list_badge(items.len());
            Category::RestrictedItems
        } else if ctx.show_only_accessible_folders && !has_accessible_descendant {
            Category::HiddenCollapsed
        } else {
            Category::BlockedVisible
        };

        trace!(node_id = id, ?category, "Classified folder");

        Classification {
            category,
            allow_list_count,
            is_personal_folder,
            display_title,
            eye_badge,
        }
    }

    /// Presentation flags for an emitted folder.
    pub fn presentation(&self, node_id: NodeId, classification: &Classification) -> Presentation {
        let ctx = self.ctx;
        let read_only_user = ctx.is_read_only_user;
        let mut p = Presentation {
            restricted: false,
            folder_class: FolderClass::Folder,
            is_read_only: false,
            is_blocked: false,
            hint: None,
            can_edit: false,
            in_personal_folders: ctx.personal_folders.contains(&node_id),
        };

        match classification.category {
            Category::Visible => {
                p.can_edit = ctx.can_create_root_folder;
            }
            Category::ReadOnly if ctx.read_only_folders.contains(&node_id) => {
                p.restricted = true;
                p.folder_class = FolderClass::FolderNotDroppable;
                p.is_read_only = true;
                p.hint = Some(NodeHint::ReadOnlyAccount);
            }
            Category::ReadOnly => {
                p.is_read_only = true;
                p.hint = Some(NodeHint::ReadOnlyAccount);
            }
            Category::LimitedAccess | Category::RestrictedItems => {
                p.restricted = true;
                p.is_read_only = read_only_user;
                p.hint = read_only_user.then_some(NodeHint::ReadOnlyAccount);
            }
            Category::BlockedVisible => {
                p.restricted = true;
                p.folder_class = FolderClass::FolderNotDroppable;
                p.is_blocked = true;
                p.hint = Some(NodeHint::NoAccess);
            }
            Category::HiddenCollapsed | Category::Excluded => {}
        }

        p
    }

    fn is_foreign_personal(&self, node: &TreeNode) -> bool {
        self.ctx.personal_folders_enabled
            && node.personal_folder
            && !self.ctx.personal_folders.contains(&node.id)
    }

    fn allow_list_badge(&self, len: usize) -> (Option<u64>, bool) {
        if self.ctx.is_read_only_user {
            (None, true)
        } else {
            (Some(len as u64), false)
        }
    }
}
