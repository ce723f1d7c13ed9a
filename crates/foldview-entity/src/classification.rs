//! Visibility categories assigned by the node classifier.

use serde::{Deserialize, Serialize};

/// Visibility category of a folder for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Full access.
    Visible,
    /// View-only access, no edit actions.
    ReadOnly,
    /// Only an explicit allow-list of items is accessible.
    LimitedAccess,
    /// Holds items shared with the user individually.
    RestrictedItems,
    /// Not shown; accessible descendants attach to the nearest shown ancestor.
    HiddenCollapsed,
    /// Shown greyed out, clicks disabled.
    BlockedVisible,
    /// Never shown.
    Excluded,
}

impl Category {
    /// Whether a node in this category appears in the output.
    pub fn is_emitted(self) -> bool {
        !matches!(self, Self::HiddenCollapsed | Self::Excluded)
    }

    /// Whether the category stems from a grant that overrides the forbidden list.
    pub fn is_override(self) -> bool {
        matches!(
            self,
            Self::Visible | Self::ReadOnly | Self::LimitedAccess | Self::RestrictedItems
        )
    }
}

/// The full result of classifying one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Visibility category.
    pub category: Category,
    /// Size of the limited/restricted allow-list, when that is the badge.
    pub allow_list_count: Option<u64>,
    /// Whether the folder is the current user's personal root folder.
    pub is_personal_folder: bool,
    /// Title to display, after personal substitution and entity decoding.
    pub display_title: String,
    /// Whether the folder carries the view-only eye marker.
    pub eye_badge: bool,
}
