use anyhow::Result;
use ignore::{WalkBuilder, overrides::OverrideBuilder};
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// Directories never searched, whatever the patterns say
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Collects files under `root` matching any of the gitignore-style `patterns`.
///
/// Ignore files are respected and the result is sorted. No patterns means no files.
pub fn collect_files(root: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    debug!("Collecting files matching {:?} under {}", patterns, root.display());

    let mut overrides = OverrideBuilder::new(root);
    for pattern in patterns {
        overrides.add(pattern)?;
    }
    for dir in SKIPPED_DIRS {
        overrides.add(&format!("!{}", dir))?;
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .overrides(overrides.build()?)
        .build();

    let mut files: Vec<PathBuf> = Vec::new();
    for res in walker {
        let dent = res?;
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        trace!("Matched file: {}", dent.path().display());
        files.push(dent.into_path());
    }
    files.sort();

    debug!("Collected {} files", files.len());
    Ok(files)
}
