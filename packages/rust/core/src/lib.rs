//! Migration pipeline and domain logic for wpmigrate.
//!
//! This crate ties together the source fetcher, the markup transformer, and
//! the destination content store into a single forward pass:
//! fetch all → create categories → create posts → create pages.

pub mod assets;
pub mod categories;
pub mod pages;
pub mod pipeline;
pub mod posts;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::AssetImporter;
pub use categories::CategoryMap;
pub use pipeline::{
    ItemKind, MigrationOptions, MigrationReport, ProgressReporter, SilentProgress, Tally,
    run_migration,
};
