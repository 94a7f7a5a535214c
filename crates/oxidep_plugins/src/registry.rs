use log::debug;

use crate::{jest::JestPlugin, plugin::Plugin, types::DependencySet};

/// The set of plugins a scan runs with. Built once up front and then only read.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Every plugin shipped with oxidep.
    pub fn builtin() -> Self {
        Self::new(Vec::new()).with_plugin(JestPlugin)
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Plugins whose enablers appear among `dependencies`, in registration order.
    pub fn enabled<'a>(&'a self, dependencies: &dyn DependencySet) -> Vec<&'a dyn Plugin> {
        let enabled: Vec<&dyn Plugin> =
            self.iter().filter(|p| p.is_enabled(dependencies)).collect();
        debug!("{} of {} plugins enabled", enabled.len(), self.plugins.len());
        enabled
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractionResult, PluginContext};
    use oxidep_core::Result;
    use std::{collections::BTreeSet, path::Path};

    struct FakePlugin;

    impl Plugin for FakePlugin {
        fn name(&self) -> &'static str {
            "Fake"
        }

        fn enablers(&self) -> &'static [&'static str] {
            &["fake-runner", "@fake/cli"]
        }

        fn config_file_patterns(&self) -> &'static [&'static str] {
            &["fake.config.json"]
        }

        fn entry_file_patterns(&self) -> &'static [&'static str] {
            &[]
        }

        fn find_dependencies(
            &self,
            _config_file: &Path,
            _ctx: &PluginContext,
        ) -> Result<ExtractionResult> {
            Ok(ExtractionResult::default())
        }
    }

    fn deps(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_builtin_contains_jest() {
        let registry = PluginRegistry::builtin();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert_eq!(registry.get("jest").map(|p| p.name()), Some("Jest"));
        assert!(registry.get("vitest").is_none());
    }

    #[test]
    fn test_enabled_filters_by_dependencies() {
        let registry = PluginRegistry::builtin().with_plugin(FakePlugin);

        let names: Vec<&str> =
            registry.enabled(&deps(&["react", "@fake/cli"])).iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Fake"]);

        let names: Vec<&str> = registry
            .enabled(&deps(&["jest", "fake-runner"]))
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["Jest", "Fake"]);

        assert!(registry.enabled(&deps(&[])).is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = PluginRegistry::new(Vec::new());
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
        assert!(registry.enabled(&deps(&["jest"])).is_empty());
    }
}
