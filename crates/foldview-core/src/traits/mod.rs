//! Core traits defined in `foldview-core` and implemented by other crates.

pub mod cache;
pub mod item_store;
pub mod tree_store;

pub use cache::CacheProvider;
pub use item_store::{ItemStore, StructureClock};
pub use tree_store::NestedTreeStore;
