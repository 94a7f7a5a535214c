use log::trace;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{INDEX_FILES, RESOLVE_EXTENSIONS};

/// Best-effort existence check. Any metadata error (missing, permission denied, ...)
/// counts as "not a file".
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

pub fn find_file(working_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let file_path = working_dir.join(file_name);
    is_file(&file_path).then_some(file_path)
}

/// Looks for `specifier` under `cwd`, first literally and then with each of
/// `extensions` appended. The first hit wins.
pub fn find_file_with_extensions(
    cwd: &Path,
    specifier: &str,
    extensions: &[&str],
) -> Option<PathBuf> {
    let file_path = cwd.join(specifier);
    if is_file(&file_path) {
        return Some(file_path);
    }
    extensions.iter().map(|ext| cwd.join(format!("{}{}", specifier, ext))).find(|p| is_file(p))
}

/// Resolves a path the way a module loader would: literal file, then
/// [`RESOLVE_EXTENSIONS`], then [`INDEX_FILES`] inside the directory.
pub fn resolve_module(path: &Path) -> Option<PathBuf> {
    trace!("Resolving module path: {}", path.display());

    if let (Some(dir), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
        && let Some(found) = find_file_with_extensions(dir, name, RESOLVE_EXTENSIONS)
    {
        return Some(found);
    }

    let found = INDEX_FILES.iter().map(|index| path.join(index)).find(|p| is_file(p));
    if found.is_none() {
        trace!("No module found for {}", path.display());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "a.js", "");
        assert!(is_file(&file));
        assert!(!is_file(temp_dir.path()));
        assert!(!is_file(&temp_dir.path().join("missing.js")));
    }

    #[test]
    fn test_find_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "package.json", "{}");
        assert_eq!(find_file(temp_dir.path(), "package.json"), Some(file));
        assert_eq!(find_file(temp_dir.path(), "tsconfig.json"), None);
    }

    #[test]
    fn test_find_file_with_extensions_literal_first() {
        let temp_dir = TempDir::new().unwrap();
        let literal = create_test_file(temp_dir.path(), "setup", "");
        create_test_file(temp_dir.path(), "setup.js", "");

        let found = find_file_with_extensions(temp_dir.path(), "setup", &[".js"]);
        assert_eq!(found, Some(literal));
    }

    #[test]
    fn test_find_file_with_extensions_order_is_tie_break() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "setup.js", "");
        let ts = create_test_file(temp_dir.path(), "setup.ts", "");

        let found = find_file_with_extensions(temp_dir.path(), "setup", &[".ts", ".js"]);
        assert_eq!(found, Some(ts));
    }

    #[test]
    fn test_find_file_with_extensions_absent() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(find_file_with_extensions(temp_dir.path(), "setup", &[".js", ".ts"]), None);
    }

    #[test]
    fn test_resolve_module_with_extension() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "test/setup.ts", "");
        assert_eq!(resolve_module(&temp_dir.path().join("test/setup")), Some(file));
    }

    #[test]
    fn test_resolve_module_index_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "helpers/index.js", "");
        assert_eq!(resolve_module(&temp_dir.path().join("helpers")), Some(file));
    }

    #[test]
    fn test_resolve_module_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(resolve_module(&temp_dir.path().join("nope")), None);
    }
}
