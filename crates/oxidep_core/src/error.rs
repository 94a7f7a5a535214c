use std::path::PathBuf;

use thiserror::Error;

/// Why a config file could not be turned into a value.
#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] json5::Error),

    /// Diagnostics reported while parsing an executable config module
    #[error("{}", .0.join("; "))]
    Syntax(Vec<String>),

    #[error("module does not export a configuration")]
    MissingExport,

    #[error("expected a configuration object, found {0}")]
    NotAnObject(&'static str),

    #[error("{0}")]
    Manifest(#[from] serde_json::Error),
}

/// A config file exists but could not be read or parsed.
#[derive(Debug, Error)]
#[error("Error loading {}", path.display())]
pub struct ConfigLoadError {
    pub path: PathBuf,
    #[source]
    pub cause: LoadCause,
}

impl ConfigLoadError {
    pub fn new(path: impl Into<PathBuf>, cause: impl Into<LoadCause>) -> Self {
        Self { path: path.into(), cause: cause.into() }
    }

    pub fn cause(&self) -> &LoadCause {
        &self.cause
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ConfigLoad(#[from] ConfigLoadError),

    /// A preset chain led back to a file that was already part of it
    #[error("Cyclic preset chain: {}", display_chain(.chain))]
    CyclicPreset { chain: Vec<PathBuf> },

    #[error("Preset chain starting at {} exceeds {max_depth} levels", .root.display())]
    PresetTooDeep { root: PathBuf, max_depth: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

fn display_chain(chain: &[PathBuf]) -> String {
    chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> ")
}
