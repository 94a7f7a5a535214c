use serde::Serialize;
use std::path::PathBuf;

/// Everything one enabled plugin found across its config and entry files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginReport {
    pub plugin: String,
    pub config_files: Vec<PathBuf>,
    pub dependencies: Vec<String>,
    /// Entry files referenced by configs, then those matched by the plugin's patterns
    pub entry_files: Vec<PathBuf>,
}

/// A config file the plugin could not extract from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginFailure {
    pub plugin: String,
    pub config_file: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub root: PathBuf,
    pub plugins: Vec<PluginReport>,
    pub failures: Vec<PluginFailure>,
    pub files_analyzed: usize,
}

impl ScanResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
