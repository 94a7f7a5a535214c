use anyhow::Result;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{
    path::{Path, PathBuf},
    thread,
    time::Instant,
};

use oxidep_core::{load_object, read_manifest_dependencies};
use oxidep_plugins::{ExtractionResult, Plugin, PluginContext, PluginRegistry};

use crate::{
    collector::collect_files,
    config::Config,
    types::{PluginFailure, PluginReport, ScanResult},
};

/// Scans the project with every builtin plugin.
pub fn run_scan(cfg: Config) -> Result<ScanResult> {
    run_scan_with(cfg, &PluginRegistry::builtin())
}

pub fn run_scan_with(mut cfg: Config, registry: &PluginRegistry) -> Result<ScanResult> {
    info!("Starting dependency scan");

    cfg.initialize()?;
    let root = cfg.root()?.clone();

    let declared = read_manifest_dependencies(&root)?;
    debug!("Project declares {} dependencies", declared.len());

    let enabled = registry.enabled(&declared);
    if enabled.is_empty() {
        info!("No plugins enabled for {}", root.display());
    }

    // One job per (plugin, config file) pair
    let mut jobs: Vec<(usize, PathBuf)> = Vec::new();
    let mut pattern_entries: Vec<Vec<PathBuf>> = Vec::with_capacity(enabled.len());
    for (idx, plugin) in enabled.iter().enumerate() {
        let config_files: Vec<PathBuf> = collect_files(&root, plugin.config_file_patterns())?
            .into_iter()
            .filter(|file| declares_config(*plugin, file))
            .collect();
        debug!("{} has {} config files", plugin.name(), config_files.len());
        jobs.extend(config_files.into_iter().map(|file| (idx, file)));
        pattern_entries.push(collect_files(&root, plugin.entry_file_patterns())?);
    }

    info!("Processing {} config files in parallel", jobs.len());
    let outcomes: Vec<(usize, PathBuf, Result<ExtractionResult, String>)> = jobs
        .into_par_iter()
        .map(|(idx, config_file)| {
            let plugin = enabled[idx];
            let thread_id = thread::current().id();
            debug!("Thread {:?} processing: {}", thread_id, config_file.display());

            let start = Instant::now();
            let outcome = plugin
                .find_dependencies(&config_file, &PluginContext::new(root.clone()))
                .map_err(|e| format!("{:#}", anyhow::Error::new(e)));
            debug!(
                "{} finished {} in {}ms",
                plugin.name(),
                config_file.display(),
                start.elapsed().as_millis()
            );
            (idx, config_file, outcome)
        })
        .collect();

    let files_analyzed = outcomes.len();
    let mut failures: Vec<PluginFailure> = Vec::new();
    let mut per_plugin: Vec<Vec<(PathBuf, ExtractionResult)>> = vec![Vec::new(); enabled.len()];
    for (idx, config_file, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                trace!(
                    "{} found {} dependencies in {}",
                    enabled[idx].name(),
                    result.dependencies.len(),
                    config_file.display()
                );
                per_plugin[idx].push((config_file, result));
            }
            Err(message) => {
                warn!("{} failed on {}: {}", enabled[idx].name(), config_file.display(), message);
                failures.push(PluginFailure {
                    plugin: enabled[idx].name().to_string(),
                    config_file,
                    message,
                });
            }
        }
    }

    let plugins: Vec<PluginReport> = enabled
        .iter()
        .zip(per_plugin)
        .zip(pattern_entries)
        .map(|((plugin, results), entries)| build_report(*plugin, results, entries))
        .collect();

    info!("Scan complete. {} plugins, {} failures", plugins.len(), failures.len());
    Ok(ScanResult { root, plugins, failures, files_analyzed })
}

/// A `package.json` only counts as a config file when it carries the plugin's key.
fn declares_config(plugin: &dyn Plugin, config_file: &Path) -> bool {
    if config_file.file_name().is_none_or(|name| name != "package.json") {
        return true;
    }
    let Some(key) = plugin.package_json_key() else {
        return false;
    };
    match load_object(config_file) {
        Ok(manifest) => manifest.contains_key(key),
        // Extraction reports the load error
        Err(_) => true,
    }
}

fn build_report(
    plugin: &dyn Plugin,
    results: Vec<(PathBuf, ExtractionResult)>,
    pattern_entries: Vec<PathBuf>,
) -> PluginReport {
    let mut config_files = Vec::with_capacity(results.len());
    let mut dependencies = Vec::new();
    let mut entry_files = Vec::new();
    for (config_file, result) in results {
        config_files.push(config_file);
        dependencies.extend(result.dependencies);
        entry_files.extend(result.entry_files);
    }
    entry_files.extend(pattern_entries);

    let merged = ExtractionResult::new(dependencies, entry_files);
    PluginReport {
        plugin: plugin.name().to_string(),
        config_files,
        dependencies: merged.dependencies,
        entry_files: merged.entry_files,
    }
}
