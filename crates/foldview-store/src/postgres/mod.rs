//! PostgreSQL store adapters.

pub mod connection;
pub mod items;
pub mod tree;

pub use connection::DatabasePool;
pub use items::{PgItemStore, PgStructureClock};
pub use tree::PgNestedTree;
