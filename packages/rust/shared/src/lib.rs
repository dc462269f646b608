//! Shared types, error model, and configuration for wpmigrate.
//!
//! This crate is the foundation depended on by all other wpmigrate crates.
//! It provides:
//! - [`MigrateError`]: the unified error type
//! - The destination document model ([`Document`], [`Block`], [`Reference`], [`Slug`])
//! - Configuration ([`AppConfig`], [`MigrationSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DestinationConfig, DestinationSettings, FetchErrorPolicy, MigrationConfig,
    MigrationSettings, Overrides, SourceConfig, SourceSettings, config_dir, config_file_path,
    init_config, load_config, load_config_from, read_token,
};
pub use error::{MigrateError, Result};
pub use types::{
    BlogPostDocument, CategoryDocument, Document, DocumentId, ImageRef, PageDocument, Reference,
    Seo, Slug, Span, Block,
};
