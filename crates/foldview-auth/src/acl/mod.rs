//! Folder access classification.

pub mod classifier;
pub mod title;

pub use classifier::{NodeClassifier, Presentation};
