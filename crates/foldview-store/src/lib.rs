//! # foldview-store
//!
//! Read-only adapters for the folder tree and the item store:
//!
//! - **memory**: an in-process nested-set tree built from a node list or a
//!   JSON snapshot, used by tests and the CLI
//! - **postgres**: queries over the `nested_tree`, `items` and `misc`
//!   tables using [sqlx](https://crates.io/crates/sqlx)
//!
//! Both implement the traits from `foldview_core::traits`.

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "memory")]
pub use memory::{MemoryItemStore, MemoryNestedTree, MemoryStructureClock, TreeSnapshot};
#[cfg(feature = "postgres")]
pub use postgres::{DatabasePool, PgItemStore, PgNestedTree, PgStructureClock};
