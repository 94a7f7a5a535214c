use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxidep_scan::Config;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxidep")]
#[command(about = "Find the packages and files that tool configs depend on", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a JavaScript/TypeScript project's tool configs
    Scan(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Scan(cfg) => {
            let num_threads = rayon::current_num_threads();
            info!("Running scan (using {} threads)", num_threads);
            debug!("Config: root={:?}, json={}", cfg.root, cfg.json);

            let json = cfg.json;
            let result = oxidep_scan::run_scan(cfg)?;
            debug!(
                "Found {} plugin reports and {} failures",
                result.plugins.len(),
                result.failures.len()
            );

            if json {
                oxidep_scan::print_json(&mut stdout, &result)?;
            } else {
                if result.plugins.is_empty() {
                    oxidep_scan::print_no_plugins_message(&mut stdout, &result)?;
                } else {
                    oxidep_scan::print_report_tree(&mut stdout, &result)?;
                }

                writeln!(
                    stdout,
                    "\n{} Finished in {}ms on {} config files (using {} threads).",
                    "●".bright_blue(),
                    start.elapsed().as_millis().to_string().cyan(),
                    result.files_analyzed.to_string().cyan(),
                    num_threads.to_string().cyan()
                )?;
            }
            stdout.flush()?;

            // Non-zero exit to fail CI
            if result.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
    }
}
