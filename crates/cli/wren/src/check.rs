//! Check command implementation

use anyhow::Result;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use wr_driver::{Config, Driver, Level, UnitReport};

pub fn run_check(config: Config, paths: &[PathBuf], format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        anyhow::bail!("Unknown format: {}", format);
    }

    let mut unit_files = Vec::new();
    for path in paths {
        unit_files.extend(find_unit_files(path)?);
    }

    if unit_files.is_empty() {
        anyhow::bail!("No unit files found in {:?}", paths);
    }

    let driver = Driver::new(config);
    let mut reports = Vec::with_capacity(unit_files.len());
    for file in &unit_files {
        reports.push(driver.check_file(file)?);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report)?;
        }
    }

    let errors: usize = reports.iter().map(|report| report.count(Level::Error)).sum();
    let warnings: usize = reports.iter().map(|report| report.count(Level::Warning)).sum();

    if format == "text" {
        if errors == 0 && warnings == 0 {
            println!("{} No issues found", "Success:".green().bold());
        } else {
            println!("{} {} errors, {} warnings", "Summary:".bold(), errors, warnings);
        }
    }

    if errors > 0 {
        anyhow::bail!("Check failed with {} errors", errors);
    }

    Ok(())
}

fn print_report(report: &UnitReport) -> Result<()> {
    if let Some(rendered) = report.render_snippets()? {
        print!("{rendered}");
        return Ok(());
    }

    for diagnostic in &report.diagnostics {
        let level = match diagnostic.level {
            Level::Error => "error".red().bold(),
            Level::Warning => "warning".yellow().bold(),
            Level::Info | Level::Allow => "info".cyan().bold(),
        };

        println!("{}[{}]: {}", level, diagnostic.code, diagnostic.message.bold());
        println!(
            "  {} {}:{} in {}",
            "-->".blue(),
            report.path,
            diagnostic.span,
            diagnostic.function
        );
        if let Some(related) = &diagnostic.related {
            println!("  {} {} at {}", "note:".cyan().bold(), related.message, related.span);
        }
        if let Some(help) = &diagnostic.help {
            println!("  {} {}", "help:".cyan().bold(), help);
        }
        println!();
    }

    Ok(())
}

fn find_unit_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "json") {
                files.push(file_path);
            }
        }
        files.sort();
    }

    Ok(files)
}
