//! In-memory store adapters.

pub mod items;
pub mod snapshot;
pub mod tree;

pub use items::{MemoryItemStore, MemoryStructureClock};
pub use snapshot::TreeSnapshot;
pub use tree::MemoryNestedTree;
