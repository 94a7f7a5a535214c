use log::{debug, trace};
use path_clean::PathClean;
use serde_json::Value;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::{
    constants::DEFAULT_MAX_PRESET_DEPTH,
    error::{Error, Result},
    fs::{is_file, resolve_module},
    loader::{RawConfig, load_object},
    specifier::{is_local, join},
};

/// Flattens configs that inherit from other configs through a preset/extends key.
///
/// Local presets (`./base.json`, `/abs/preset.js`) are loaded and merged in, with
/// the inheriting file's own keys winning. Package presets (`ts-jest`) are left in
/// place for the caller to treat as a dependency.
#[derive(Debug, Clone)]
pub struct ExtensibleConfig<'k> {
    preset_key: &'k str,
    max_depth: usize,
}

impl<'k> ExtensibleConfig<'k> {
    pub fn new(preset_key: &'k str) -> Self {
        Self { preset_key, max_depth: DEFAULT_MAX_PRESET_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Loads and flattens the config at `config_path`. A missing file yields an
    /// empty config.
    pub fn resolve(&self, config_path: &Path) -> Result<RawConfig> {
        if !is_file(config_path) {
            debug!("Config file not found: {}", config_path.display());
            return Ok(RawConfig::new());
        }
        let config = load_object(config_path)?;
        self.resolve_from(config_path, config)
    }

    /// Flattens an already loaded config that lives at `config_path`.
    pub fn resolve_from(&self, config_path: &Path, config: RawConfig) -> Result<RawConfig> {
        trace!("Resolving preset chain from {}", config_path.display());

        // Chain of configs from the starting file outward to its farthest preset
        let mut chain: Vec<RawConfig> = vec![config];
        let mut visited: Vec<PathBuf> = vec![config_path.clean()];
        let mut seen: HashSet<PathBuf> = visited.iter().cloned().collect();
        let mut current = config_path.to_path_buf();

        loop {
            let Some(config) = chain.last_mut() else {
                break;
            };
            let Some(Value::String(preset)) = config.get(self.preset_key) else {
                break;
            };
            if !is_local(preset) {
                trace!("Leaving package preset '{}' unresolved", preset);
                break;
            }

            let joined = join(&current, preset);
            let preset_path = resolve_module(&joined).unwrap_or(joined);
            config.remove(self.preset_key);
            debug!("Following preset {} from {}", preset_path.display(), current.display());

            let normalized = preset_path.clean();
            visited.push(normalized.clone());
            if !seen.insert(normalized) {
                return Err(Error::CyclicPreset { chain: visited });
            }
            if chain.len() > self.max_depth {
                return Err(Error::PresetTooDeep {
                    root: config_path.to_path_buf(),
                    max_depth: self.max_depth,
                });
            }

            let parent = if is_file(&preset_path) {
                load_object(&preset_path)?
            } else {
                debug!("Preset file not found: {}", preset_path.display());
                RawConfig::new()
            };
            chain.push(parent);
            current = preset_path;
        }

        // Fold from the farthest preset inward so that nearer files override
        let mut merged = chain.pop().unwrap_or_default();
        while let Some(child) = chain.pop() {
            for (key, value) in child {
                merged.insert(key, value);
            }
        }

        debug!("Resolved config {} ({} keys)", config_path.display(), merged.len());
        Ok(merged)
    }
}
