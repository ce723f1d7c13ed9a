//! Per-user folder tree construction.

pub mod builder;
pub mod cache;
pub mod collapser;
pub mod counter;
pub mod invariant;
pub mod service;
pub mod subtree;

pub use builder::TreeBuilder;
pub use cache::{CacheEntry, TreeCache};
pub use collapser::CollapseState;
pub use counter::ItemCounter;
pub use invariant::verify_parent_refs;
pub use service::{BuildMode, TreeLoad, TreeRequest, TreeService};
pub use subtree::{SubtreeIndex, SubtreeSummary};
