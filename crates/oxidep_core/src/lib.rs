//! Core utilities for oxidep.
//!
//! This crate holds the tool-independent machinery for reading third-party
//! tool configurations in JavaScript/TypeScript projects:
//! - Probing the filesystem and resolving module paths with extensions
//! - Loading config files (JSON with comments, or JS/TS modules evaluated statically)
//! - Classifying specifiers as local paths, templated paths or packages
//! - Flattening configs that inherit from presets
//! - Reading declared dependencies from `package.json`

mod config;
mod constants;
mod error;
mod fs;
mod loader;
mod module;
mod resolver;
mod specifier;

// Re-export public API
pub use config::{find_git_root, read_manifest_dependencies};
pub use constants::{
    DEFAULT_MAX_PRESET_DEPTH, INDEX_FILES, MODULE_CONFIG_EXTENSIONS, RESOLVE_EXTENSIONS,
    ROOT_DIR_PLACEHOLDER,
};
pub use error::{ConfigLoadError, Error, LoadCause, Result};
pub use fs::{find_file, find_file_with_extensions, is_file, resolve_module};
pub use loader::{RawConfig, load, load_object};
pub use resolver::ExtensibleConfig;
pub use specifier::{
    Classified, SpecifierKind, classify, expand_root_dir, is_absolute, is_local, is_templated,
    join, package_name_of,
};
