use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
};

use oxidep_core::package_name_of;

/// Dependencies and entry files implied by one plugin config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub dependencies: Vec<String>,
    pub entry_files: Vec<PathBuf>,
}

impl ExtractionResult {
    /// Normalizes every dependency to its package name and drops repeats, keeping
    /// the first occurrence of each dependency and entry file.
    pub fn new<D, E>(dependencies: D, entry_files: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator<Item = PathBuf>,
    {
        let mut seen = HashSet::new();
        let dependencies = dependencies
            .into_iter()
            .map(|d| package_name_of(d.as_ref()).to_string())
            .filter(|d| seen.insert(d.clone()))
            .collect();

        let mut seen = HashSet::new();
        let entry_files = entry_files.into_iter().filter(|p| seen.insert(p.clone())).collect();

        Self { dependencies, entry_files }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.entry_files.is_empty()
    }
}

/// Working-directory context handed to every extractor.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub cwd: PathBuf,
}

impl PluginContext {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

/// Anything that can answer whether a project declares a package.
pub trait DependencySet {
    fn has_dependency(&self, name: &str) -> bool;
}

impl DependencySet for HashSet<String> {
    fn has_dependency(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl DependencySet for BTreeSet<String> {
    fn has_dependency(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl DependencySet for [String] {
    fn has_dependency(&self, name: &str) -> bool {
        self.iter().any(|d| d == name)
    }
}

impl DependencySet for Vec<String> {
    fn has_dependency(&self, name: &str) -> bool {
        self.as_slice().has_dependency(name)
    }
}

impl DependencySet for [&str] {
    fn has_dependency(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

/// A config value naming a module, either bare or paired with its options,
/// e.g. `"ts-jest"` or `["ts-jest", { "isolatedModules": true }]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModuleReference {
    Name(String),
    NameWithOptions(String, Value),
}

impl ModuleReference {
    pub fn name(&self) -> &str {
        match self {
            ModuleReference::Name(name) | ModuleReference::NameWithOptions(name, _) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extraction_result_normalizes_and_dedups() {
        let result = ExtractionResult::new(
            ["ts-jest", "@testing-library/jest-dom/extend-expect", "ts-jest/presets/default", "jest-environment-jsdom"],
            [PathBuf::from("/p/setup.js"), PathBuf::from("/p/setup.js")],
        );
        assert_eq!(
            result.dependencies,
            vec!["ts-jest", "@testing-library/jest-dom", "jest-environment-jsdom"]
        );
        assert_eq!(result.entry_files, vec![PathBuf::from("/p/setup.js")]);
        assert!(!result.is_empty());
        assert!(ExtractionResult::default().is_empty());
    }

    #[test]
    fn test_extraction_result_serializes_camel_case() {
        let result = ExtractionResult::new(["jest"], [PathBuf::from("/p/a.js")]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"dependencies": ["jest"], "entryFiles": ["/p/a.js"]})
        );
    }

    #[test]
    fn test_dependency_sets() {
        let vec_set = vec!["jest".to_string()];
        let hash_set: HashSet<String> = vec_set.iter().cloned().collect();
        let btree_set: BTreeSet<String> = vec_set.iter().cloned().collect();
        let strs: &[&str] = &["jest"];
        assert!(strs.has_dependency("jest"));

        for set in [&vec_set as &dyn DependencySet, &hash_set, &btree_set] {
            assert!(set.has_dependency("jest"));
            assert!(!set.has_dependency("vitest"));
        }
    }

    #[test]
    fn test_module_reference_variants() {
        let bare: ModuleReference = serde_json::from_value(json!("babel-jest")).unwrap();
        assert_eq!(bare, ModuleReference::Name("babel-jest".to_string()));
        assert_eq!(bare.name(), "babel-jest");

        let tuple: ModuleReference = serde_json::from_value(json!(["ts-jest", {}])).unwrap();
        assert_eq!(tuple.name(), "ts-jest");
        assert!(matches!(tuple, ModuleReference::NameWithOptions(_, _)));

        assert!(serde_json::from_value::<ModuleReference>(json!({"name": "x"})).is_err());
    }
}
