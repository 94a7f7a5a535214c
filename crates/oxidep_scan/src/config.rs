use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "scan")]
#[command(about = "Report the packages and entry files referenced by tool configs")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Print the result as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Initialize the config by resolving the root directory
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for git root");
            oxidep_core::find_git_root()?
        };
        info!("Using root directory: {}", root.display());

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_root_before_initialize() {
        let cfg = Config { root: None, json: false };
        assert!(cfg.root().is_err());
    }

    #[test]
    fn test_initialize_canonicalizes_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = Config { root: Some(temp_dir.path().join(".")), json: false };
        cfg.initialize().unwrap();
        assert_eq!(cfg.root().unwrap(), &temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_parse_args() {
        let cfg = Config::parse_from(["scan", "--root", "/tmp/project", "--json"]);
        assert_eq!(cfg.root, Some(PathBuf::from("/tmp/project")));
        assert!(cfg.json);

        let cfg = Config::parse_from(["scan"]);
        assert_eq!(cfg.root, None);
        assert!(!cfg.json);
    }
}
