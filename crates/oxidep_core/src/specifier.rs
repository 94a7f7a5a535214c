use log::trace;
use path_clean::PathClean;
use std::path::{Path, PathBuf};

use crate::constants::ROOT_DIR_PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Relative (`./x`, `../x`) or absolute file path
    Local,
    /// Path containing the root-dir placeholder, already expanded
    Templated,
    /// Bare package identifier, possibly with a sub-path
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: SpecifierKind,
    /// The token itself, or the expanded absolute path for [`SpecifierKind::Templated`]
    pub value: String,
}

impl Classified {
    pub fn is_package(&self) -> bool {
        self.kind == SpecifierKind::Package
    }
}

pub fn is_absolute(token: &str) -> bool {
    Path::new(token).is_absolute()
}

pub fn is_local(token: &str) -> bool {
    token.starts_with('.') || is_absolute(token)
}

pub fn is_templated(token: &str) -> bool {
    token.contains(ROOT_DIR_PLACEHOLDER)
}

/// Replaces everything up to and including the last root-dir placeholder with `root`.
pub fn expand_root_dir(token: &str, root: &Path) -> PathBuf {
    let rest = match token.rfind(ROOT_DIR_PLACEHOLDER) {
        Some(idx) => &token[idx + ROOT_DIR_PLACEHOLDER.len()..],
        None => token,
    };
    root.join(rest.trim_start_matches(['/', '\\'])).clean()
}

/// Classifies a token by syntax alone. Templated tokens are expanded against `cwd`.
pub fn classify(token: &str, cwd: &Path) -> Classified {
    let classified = if is_templated(token) {
        let expanded = expand_root_dir(token, cwd);
        Classified { kind: SpecifierKind::Templated, value: expanded.to_string_lossy().into_owned() }
    } else if is_local(token) {
        Classified { kind: SpecifierKind::Local, value: token.to_string() }
    } else {
        Classified { kind: SpecifierKind::Package, value: token.to_string() }
    };
    trace!("Classified '{}' as {:?}", token, classified.kind);
    classified
}

/// Strips the sub-path from a package specifier, keeping npm scopes intact.
pub fn package_name_of(token: &str) -> &str {
    let mut slashes = token.match_indices('/').map(|(idx, _)| idx);
    let cut = if token.starts_with('@') {
        slashes.nth(1)
    } else {
        slashes.next()
    };
    match cut {
        Some(idx) => &token[..idx],
        None => token,
    }
}

/// Resolves `token` against the directory containing `base_file`. Absolute tokens
/// are returned unchanged.
pub fn join(base_file: &Path, token: &str) -> PathBuf {
    if is_absolute(token) {
        return PathBuf::from(token);
    }
    let base_dir = base_file.parent().unwrap_or(base_file);
    base_dir.join(token).clean()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_of() {
        assert_eq!(package_name_of("@scope/name/sub/path"), "@scope/name");
        assert_eq!(package_name_of("@scope/name"), "@scope/name");
        assert_eq!(package_name_of("name/sub/path"), "name");
        assert_eq!(package_name_of("name/sub"), "name");
        assert_eq!(package_name_of("name"), "name");
        assert_eq!(package_name_of("@scope"), "@scope");
        assert_eq!(package_name_of(""), "");
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("./setup.js"));
        assert!(is_local("../shared/setup"));
        assert!(is_local("/abs/setup.js"));
        assert!(!is_local("ts-jest"));
        assert!(!is_local("@testing-library/jest-dom/extend-expect"));
    }

    #[test]
    fn test_classify_is_total() {
        let cwd = Path::new("/proj");
        for token in ["./a", "/a", "<rootDir>/a", "a", "@s/a", "", "<rootDir>"] {
            let classified = classify(token, cwd);
            assert!(matches!(
                classified.kind,
                SpecifierKind::Local | SpecifierKind::Templated | SpecifierKind::Package
            ));
        }
    }

    #[test]
    fn test_classify_kinds() {
        let cwd = Path::new("/proj");
        assert_eq!(classify("./setup.js", cwd).kind, SpecifierKind::Local);
        assert_eq!(classify("/abs/setup.js", cwd).kind, SpecifierKind::Local);
        assert_eq!(classify("jest-extended/all", cwd).kind, SpecifierKind::Package);
        assert!(classify("jest-extended/all", cwd).is_package());

        let templated = classify("<rootDir>/test/setup.js", cwd);
        assert_eq!(templated.kind, SpecifierKind::Templated);
        assert_eq!(templated.value, "/proj/test/setup.js");
    }

    #[test]
    fn test_expand_root_dir() {
        let root = Path::new("/proj");
        assert_eq!(expand_root_dir("<rootDir>/test/setup.js", root), PathBuf::from("/proj/test/setup.js"));
        assert_eq!(expand_root_dir("<rootDir>test/setup.js", root), PathBuf::from("/proj/test/setup.js"));
        assert_eq!(expand_root_dir("<rootDir>/../shared/x.js", root), PathBuf::from("/shared/x.js"));
        assert_eq!(expand_root_dir("junk/<rootDir>/a.js", root), PathBuf::from("/proj/a.js"));
    }

    #[test]
    fn test_join() {
        assert_eq!(join(Path::new("/a/b/config.json"), "./c.js"), PathBuf::from("/a/b/c.js"));
        assert_eq!(join(Path::new("/a/b/config.json"), "../c.js"), PathBuf::from("/a/c.js"));
        assert_eq!(join(Path::new("/a/b/config.json"), "/x/y.js"), PathBuf::from("/x/y.js"));
    }
}
