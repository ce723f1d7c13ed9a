//! # foldview-auth
//!
//! Per-user folder visibility: decides, from the session's access-control
//! sets, how each folder of the shared tree is presented.

pub mod acl;

pub use acl::NodeClassifier;
