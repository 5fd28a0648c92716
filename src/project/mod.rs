//! Project management: import resolution, dependency packages, build-tool
//! configuration, and raw source documents.
//!
//! The entry point is [`Project`], which aggregates the root package, the
//! dependency packages discovered under library directories, and the
//! remapping list read from build-tool configuration. `Project::resolve_import`
//! is the single import-resolution entry point used by the rest of the crate.

mod config;
mod file_loader;
mod package;
#[allow(clippy::module_inception)]
mod project;
mod remapping;
mod sources;

pub use config::{
    BrownieConfigReader, ConfigReader, FoundryConfigReader, ProjectConfig, RemappingsFileReader,
    default_readers, load_config,
};
pub use file_loader::collect_sol_files;
pub use package::Package;
pub use project::{ImportResolver, Project};
pub use remapping::{Remapping, best_remapping};
pub use sources::{RawImport, SourceDocument, SourceDocumentStore, extract_imports};
