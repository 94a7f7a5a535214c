//! Tool plugins for oxidep.
//!
//! A plugin knows when a third-party tool is in use, where its config and entry
//! files live, and which packages and files a config file references.
//!
//! # Examples
//!
//! ```no_run
//! use oxidep_plugins::{PluginContext, PluginRegistry};
//! use std::path::Path;
//!
//! # fn main() -> oxidep_core::Result<()> {
//! let registry = PluginRegistry::builtin();
//! let ctx = PluginContext::new("/path/to/project");
//!
//! if let Some(jest) = registry.get("jest") {
//!     let result = jest.find_dependencies(Path::new("/path/to/project/jest.config.js"), &ctx)?;
//!     println!("{:?}", result.dependencies);
//! }
//! # Ok(())
//! # }
//! ```

mod jest;
mod plugin;
mod registry;
mod types;

// Re-export public API
pub use jest::JestPlugin;
pub use plugin::{Plugin, ReferenceCollector, has_dependency, load_plugin_config};
pub use registry::PluginRegistry;
pub use types::{DependencySet, ExtractionResult, ModuleReference, PluginContext};
