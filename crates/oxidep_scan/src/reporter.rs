use std::{
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{PluginFailure, PluginReport, ScanResult};

/// Show a path relative to the project root when it lives under it
fn display_path(root: &Path, path: &Path) -> String {
    match make_relative(path, root) {
        Some(rel_path) if !rel_path.starts_with("..") => {
            let result = rel_path.to_string_lossy().to_string();
            trace!("Relativized '{}' to '{}'", path.display(), result);
            result
        }
        _ => path.to_string_lossy().to_string(),
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components();
    let mut base_components = base.components();

    let mut common_prefix_len = 0;
    let mut target_parts = Vec::new();
    let mut base_parts = Vec::new();

    loop {
        match (target_components.next(), base_components.next()) {
            (Some(t), Some(b)) if t == b => {
                common_prefix_len += 1;
            }
            (Some(t), Some(b)) => {
                target_parts.push(t);
                base_parts.push(b);
                break;
            }
            (Some(t), None) => {
                target_parts.push(t);
                break;
            }
            (None, Some(b)) => {
                base_parts.push(b);
                break;
            }
            (None, None) => {
                return Some(PathBuf::from("."));
            }
        }
    }

    target_parts.extend(target_components);
    base_parts.extend(base_components);

    if common_prefix_len == 0 && target.components().next() != base.components().next() {
        return None;
    }

    // One ".." per unmatched base component, then the rest of the target
    let mut result = PathBuf::new();
    for _ in &base_parts {
        result.push("..");
    }
    for component in target_parts {
        match component {
            Component::Normal(p) => result.push(p),
            Component::CurDir => {}
            Component::ParentDir => result.push(".."),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

pub fn print_no_plugins_message<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    debug!("No plugins enabled");
    writeln!(
        writer,
        "{} No supported tools found in {}",
        "✓".green().bold(),
        result.root.display()
    )?;
    writer.flush()?;
    Ok(())
}

pub fn print_json<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, result)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn print_report_tree<W: Write>(writer: &mut W, result: &ScanResult) -> io::Result<()> {
    debug!("Printing report tree for {} plugins", result.plugins.len());

    for report in &result.plugins {
        print_plugin(writer, &result.root, report)?;
        writeln!(writer)?;
    }

    if result.has_failures() {
        print_failures(writer, &result.root, &result.failures)?;
    }

    writer.flush()?;
    Ok(())
}

fn print_plugin<W: Write>(writer: &mut W, root: &Path, report: &PluginReport) -> io::Result<()> {
    writeln!(
        writer,
        "{} ({} config files)",
        report.plugin.bright_white().bold(),
        report.config_files.len().to_string().cyan()
    )?;

    let sections: [(&str, Vec<String>); 3] = [
        (
            "config",
            report.config_files.iter().map(|p| display_path(root, p)).collect(),
        ),
        ("dependencies", report.dependencies.clone()),
        ("entry files", report.entry_files.iter().map(|p| display_path(root, p)).collect()),
    ];

    for (idx, (label, items)) in sections.iter().enumerate() {
        let is_last_section = idx == sections.len() - 1;
        let (prefix, indent) = if is_last_section { ("└──", "    ") } else { ("├──", "│   ") };
        writeln!(writer, "{}  {} ({})", prefix.dimmed(), label, items.len().to_string().yellow())?;

        for (item_idx, item) in items.iter().enumerate() {
            let item_prefix = if item_idx == items.len() - 1 { "└──" } else { "├──" };
            writeln!(writer, "{}{}  {}", indent.dimmed(), item_prefix.dimmed(), item.blue())?;
        }
    }

    Ok(())
}

fn print_failures<W: Write>(
    writer: &mut W,
    root: &Path,
    failures: &[PluginFailure],
) -> io::Result<()> {
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(
        writer,
        "{} {} config files could not be read",
        "✗".red().bold(),
        failures.len().to_string().red().bold()
    )?;
    for failure in failures {
        writeln!(
            writer,
            "  {} {}: {}",
            failure.plugin.bold(),
            display_path(root, &failure.config_file).blue(),
            failure.message.red()
        )?;
    }
    Ok(())
}
