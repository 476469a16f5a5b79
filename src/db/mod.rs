//! Database module: write payloads and SQL repositories for saved links.
//!
//! - `model`: payloads and filters passed into the repository.
//! - `repo`: SQL-only functions that map rows into `crate::model::LinkRecord`.
//!
//! External modules import from `link_inbox::db`; the repository API is
//! re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::{LinkMetadata, ListFilter};
