use log::{debug, trace};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    collections::BTreeSet,
    env, io,
    path::{Path, PathBuf},
};

use crate::{error::ConfigLoadError, fs::find_file, loader::load};

pub fn find_git_root() -> io::Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = env::current_dir()?;
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "Could not find .git directory in any parent folder",
                ));
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PackageManifest {
    dependencies: Map<String, Value>,
    dev_dependencies: Map<String, Value>,
    peer_dependencies: Map<String, Value>,
    optional_dependencies: Map<String, Value>,
}

/// Collects every package name declared in `root/package.json`. A project
/// without a manifest declares nothing.
pub fn read_manifest_dependencies(root: &Path) -> Result<BTreeSet<String>, ConfigLoadError> {
    let Some(manifest_path) = find_file(root, "package.json") else {
        debug!("No package.json found in {}", root.display());
        return Ok(BTreeSet::new());
    };

    let value = load(&manifest_path)?;
    let manifest: PackageManifest =
        serde_json::from_value(value).map_err(|e| ConfigLoadError::new(&manifest_path, e))?;

    let dependencies: BTreeSet<String> = [
        manifest.dependencies,
        manifest.dev_dependencies,
        manifest.peer_dependencies,
        manifest.optional_dependencies,
    ]
    .into_iter()
    .flat_map(|section| section.into_iter().map(|(name, _)| name))
    .collect();

    debug!(
        "Read {} declared dependencies from {}",
        dependencies.len(),
        manifest_path.display()
    );
    Ok(dependencies)
}
