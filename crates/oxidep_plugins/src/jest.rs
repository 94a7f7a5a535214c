//! Jest test runner.
//!
//! See <https://jestjs.io/docs/configuration> for the fields read here.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use oxidep_core::{RawConfig, Result, join};

use crate::{
    plugin::{Plugin, ReferenceCollector, load_plugin_config},
    types::{ExtractionResult, ModuleReference, PluginContext},
};

pub const NAME: &str = "Jest";

pub const ENABLERS: &[&str] = &["jest"];

pub const CONFIG_FILE_PATTERNS: &[&str] = &["jest.config.{js,ts,mjs,cjs,json}", "package.json"];

pub const ENTRY_FILE_PATTERNS: &[&str] =
    &["**/__tests__/**/*.{js,jsx,ts,tsx}", "**/*.{test,spec}.{js,jsx,ts,tsx}"];

const PACKAGE_JSON_KEY: &str = "jest";

const PRESET_KEY: &str = "preset";

/// Environments that ship with Jest itself
const BUILTIN_ENVIRONMENTS: &[&str] = &["node"];

/// Bare environment names resolve to `jest-environment-<name>`
const ENVIRONMENT_PREFIX: &str = "jest-environment-";

const BUILTIN_REPORTERS: &[&str] = &["default", "summary", "github-actions"];

#[derive(Debug, Clone, Copy, Default)]
pub struct JestPlugin;

impl Plugin for JestPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn enablers(&self) -> &'static [&'static str] {
        ENABLERS
    }

    fn config_file_patterns(&self) -> &'static [&'static str] {
        CONFIG_FILE_PATTERNS
    }

    fn entry_file_patterns(&self) -> &'static [&'static str] {
        ENTRY_FILE_PATTERNS
    }

    fn package_json_key(&self) -> Option<&'static str> {
        Some(PACKAGE_JSON_KEY)
    }

    fn find_dependencies(
        &self,
        config_file: &Path,
        ctx: &PluginContext,
    ) -> Result<ExtractionResult> {
        let Some(raw) = load_plugin_config(config_file, self.package_json_key(), PRESET_KEY)?
        else {
            return Ok(ExtractionResult::default());
        };
        let config = JestConfig::from_raw(&raw, config_file);

        let root_dir: PathBuf = match &config.root_dir {
            Some(dir) => join(config_file, dir),
            None => ctx.cwd.clone(),
        };
        let mut refs = ReferenceCollector::new(config_file, &root_dir);

        let presets: Vec<String> = config.preset.iter().filter_map(|p| refs.reference(p)).collect();

        let environments: Vec<String> = config
            .test_environment
            .iter()
            .filter_map(|env| refs.reference(env))
            .filter_map(|env| environment_package(&env))
            .collect();

        let mut dependencies: Vec<String> = Vec::new();
        for name in config.setup_files.iter().chain(&config.setup_files_after_env) {
            dependencies.extend(refs.reference(name));
        }
        for transform in &config.transform {
            dependencies.extend(refs.reference(transform.name()));
        }
        for name in [
            &config.global_setup,
            &config.global_teardown,
            &config.test_sequencer,
            &config.snapshot_resolver,
            &config.test_runner,
        ]
        .into_iter()
        .flatten()
        {
            dependencies.extend(refs.reference(name));
        }
        for reporter in config.reporters.iter().filter(|r| !BUILTIN_REPORTERS.contains(&r.name())) {
            dependencies.extend(refs.reference(reporter.name()));
        }

        let resolvers: Vec<String> =
            config.resolver.iter().filter_map(|r| refs.reference(r)).collect();

        let watch_plugins: Vec<String> =
            config.watch_plugins.iter().filter_map(|w| refs.reference(w.name())).collect();

        let result = ExtractionResult::new(
            presets
                .into_iter()
                .chain(environments)
                .chain(dependencies)
                .chain(resolvers)
                .chain(watch_plugins),
            refs.into_entry_files(),
        );
        debug!(
            "Jest config {} implies {} dependencies and {} entry files",
            config_file.display(),
            result.dependencies.len(),
            result.entry_files.len()
        );
        Ok(result)
    }
}

fn environment_package(name: &str) -> Option<String> {
    if BUILTIN_ENVIRONMENTS.contains(&name) {
        None
    } else if name.starts_with(ENVIRONMENT_PREFIX) || name.starts_with('@') {
        Some(name.to_string())
    } else {
        Some(format!("{}{}", ENVIRONMENT_PREFIX, name))
    }
}

/// The subset of Jest options that reference modules.
#[derive(Debug, Default)]
struct JestConfig {
    preset: Option<String>,
    root_dir: Option<String>,
    test_environment: Option<String>,
    setup_files: Vec<String>,
    setup_files_after_env: Vec<String>,
    transform: Vec<ModuleReference>,
    global_setup: Option<String>,
    global_teardown: Option<String>,
    test_sequencer: Option<String>,
    snapshot_resolver: Option<String>,
    test_runner: Option<String>,
    reporters: Vec<ModuleReference>,
    resolver: Option<String>,
    watch_plugins: Vec<ModuleReference>,
}

impl JestConfig {
    /// Reads each option on its own so one malformed field doesn't hide the rest.
    fn from_raw(raw: &RawConfig, config_file: &Path) -> Self {
        let fields = Fields { raw, config_file };
        Self {
            preset: fields.get("preset"),
            root_dir: fields.get("rootDir"),
            test_environment: fields.get("testEnvironment"),
            setup_files: fields.get("setupFiles").unwrap_or_default(),
            setup_files_after_env: fields.get("setupFilesAfterEnv").unwrap_or_default(),
            transform: fields
                .get::<RawConfig>("transform")
                .map(|map| fields.references("transform", map.into_iter().map(|(_, v)| v)))
                .unwrap_or_default(),
            global_setup: fields.get("globalSetup"),
            global_teardown: fields.get("globalTeardown"),
            test_sequencer: fields.get("testSequencer"),
            snapshot_resolver: fields.get("snapshotResolver"),
            test_runner: fields.get("testRunner"),
            reporters: fields
                .get::<Vec<Value>>("reporters")
                .map(|items| fields.references("reporters", items))
                .unwrap_or_default(),
            resolver: fields.get("resolver"),
            watch_plugins: fields
                .get::<Vec<Value>>("watchPlugins")
                .map(|items| fields.references("watchPlugins", items))
                .unwrap_or_default(),
        }
    }
}

struct Fields<'a> {
    raw: &'a RawConfig,
    config_file: &'a Path,
}

impl Fields<'_> {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.raw.get(key)?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed '{}' in {}: {}", key, self.config_file.display(), e);
                None
            }
        }
    }

    fn references(
        &self,
        key: &str,
        values: impl IntoIterator<Item = Value>,
    ) -> Vec<ModuleReference> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    warn!("Ignoring malformed '{}' entry in {}: {}", key, self.config_file.display(), e);
                    None
                }
            })
            .collect()
    }
}
