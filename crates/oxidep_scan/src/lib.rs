//! Project scan driver for oxidep.
//!
//! Reads the declared dependencies of a JavaScript/TypeScript project, enables
//! the plugins whose tools it uses, and runs every plugin over every matching
//! config file in parallel.
//!
//! # Examples
//!
//! ```no_run
//! use oxidep_scan::{Config, run_scan};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config { root: Some(std::path::PathBuf::from("/path/to/project")), json: false };
//!
//! let result = run_scan(cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! oxidep_scan::print_report_tree(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod checker;
mod collector;
mod config;
mod reporter;
mod types;

// Re-export public API
pub use checker::{run_scan, run_scan_with};
pub use collector::collect_files;
pub use config::Config;
pub use reporter::{print_json, print_no_plugins_message, print_report_tree};
pub use types::{PluginFailure, PluginReport, ScanResult};
