//! # foldview-service
//!
//! Builds the per-user folder tree. The builder reads the nested-set store
//! once per build, classifies each folder, reparents accessible descendants of hidden
//! folders, attaches item counts, and the [`TreeService`] caches the result
//! per session until the folder structure changes.
//!
//! Dependencies are injected at construction time as `Arc` references.

pub mod tree;

pub use tree::{
    BuildMode, CacheEntry, ItemCounter, TreeBuilder, TreeCache, TreeLoad, TreeRequest,
    TreeService, verify_parent_refs,
};
