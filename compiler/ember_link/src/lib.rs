//! Ember Link - cross-module import resolution
//!
//! Extraction leaves every import unresolved. [`link`] takes the metadata of
//! a whole working set, resolves each import against the standard-library
//! [`StdlibCatalog`] or a sibling module's exports, and hands back a
//! [`LinkedSet`] in which every import carries its export descriptor.

mod catalog;
mod resolve;

pub use catalog::{StdlibCatalog, STDLIB_MODULES};
pub use resolve::{link, LinkedModule, LinkedSet};
