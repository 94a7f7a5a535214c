use log::{debug, trace};
use serde_json::Value;
use std::path::{Path, PathBuf};

use oxidep_core::{
    ExtensibleConfig, RawConfig, Result, classify, is_file, join, load_object, resolve_module,
};

use crate::types::{DependencySet, ExtractionResult, PluginContext};

/// One supported external tool: when it applies, where its config and entry
/// files live, and what a config file implies.
///
/// Implementations are immutable and shared across threads by the scanner.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Packages whose presence in the project turns the plugin on
    fn enablers(&self) -> &'static [&'static str];

    fn is_enabled(&self, dependencies: &dyn DependencySet) -> bool {
        has_dependency(dependencies, self.enablers())
    }

    fn config_file_patterns(&self) -> &'static [&'static str];

    fn entry_file_patterns(&self) -> &'static [&'static str];

    /// Key under which `package.json` may carry the tool's config inline
    fn package_json_key(&self) -> Option<&'static str> {
        None
    }

    fn find_dependencies(
        &self,
        config_file: &Path,
        ctx: &PluginContext,
    ) -> Result<ExtractionResult>;
}

pub fn has_dependency(dependencies: &dyn DependencySet, names: &[&str]) -> bool {
    names.iter().any(|name| dependencies.has_dependency(name))
}

/// Loads a plugin's config and flattens its presets.
///
/// Returns `None` when the file does not exist, or when it is a `package.json`
/// without the plugin's key.
pub fn load_plugin_config(
    config_file: &Path,
    package_json_key: Option<&str>,
    preset_key: &str,
) -> Result<Option<RawConfig>> {
    if !is_file(config_file) {
        debug!("Config file not found: {}", config_file.display());
        return Ok(None);
    }

    let resolver = ExtensibleConfig::new(preset_key);
    let is_manifest = config_file.file_name().is_some_and(|name| name == "package.json");

    if !is_manifest {
        return resolver.resolve(config_file).map(Some);
    }

    let Some(key) = package_json_key else {
        trace!("Plugin does not read package.json: {}", config_file.display());
        return Ok(None);
    };
    let mut manifest = load_object(config_file)?;
    match manifest.remove(key) {
        Some(Value::Object(config)) => resolver.resolve_from(config_file, config).map(Some),
        Some(_) => {
            debug!("Ignoring non-object '{}' in {}", key, config_file.display());
            Ok(None)
        }
        None => {
            trace!("No '{}' key in {}", key, config_file.display());
            Ok(None)
        }
    }
}

/// Sorts config references into entry files and package names.
///
/// Local and templated references are resolved against the config file (and the
/// root dir for templates) and recorded as entry files. Package references are
/// handed back to the caller, which decides where in its dependency order they go.
pub struct ReferenceCollector<'a> {
    config_file: &'a Path,
    root_dir: &'a Path,
    entry_files: Vec<PathBuf>,
}

impl<'a> ReferenceCollector<'a> {
    pub fn new(config_file: &'a Path, root_dir: &'a Path) -> Self {
        Self { config_file, root_dir, entry_files: Vec::new() }
    }

    /// Returns the package named by `token`, or records it as an entry file.
    pub fn reference(&mut self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }

        let classified = classify(token, self.root_dir);
        if classified.is_package() {
            return Some(classified.value);
        }

        let path = join(self.config_file, &classified.value);
        let resolved = resolve_module(&path).unwrap_or(path);
        trace!("Entry file from '{}': {}", token, resolved.display());
        self.entry_files.push(resolved);
        None
    }

    pub fn into_entry_files(self) -> Vec<PathBuf> {
        self.entry_files
    }
}
