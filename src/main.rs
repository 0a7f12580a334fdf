//! Main entry point for the uecrash CLI application.
//!
//! Extracts or lists the files inside a uecrash crash report container.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use uecrash::{ArchiveReport, Cli, CrashExtractor, EntryStatus, LocalArchive};

/// Application entry point.
///
/// Errors that prevent reading the archive at all (missing file, unreadable
/// header) exit with status 2, the same as an aborted archive.
fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("uecrash: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Open the archive and dispatch to listing or extraction.
fn run(cli: &Cli) -> Result<ExitCode> {
    let archive = LocalArchive::open(Path::new(&cli.file))?;
    debug!(
        "opened {} ({} compressed)",
        archive.path().display(),
        format_size(archive.size())
    );

    let extractor = CrashExtractor::new(archive.decompressed());

    // List mode: decode every entry, write nothing
    if cli.is_listing() {
        let report = extractor
            .list()
            .with_context(|| format!("cannot read header of '{}'", cli.file))?;
        list_entries(&report, cli.verbose);
        return Ok(exit_status(&report));
    }

    let dest = cli
        .extract_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if !cli.is_quiet() {
        println!("Archive:  {}", cli.file);
    }

    let report = extractor
        .extract_to_dir(&dest)
        .with_context(|| format!("cannot read header of '{}'", cli.file))?;
    report_extraction(&report, cli);

    Ok(exit_status(&report))
}

/// Map a report to the process exit status.
///
/// - 0: every declared entry was extracted
/// - 1: the archive completed but some entries failed
/// - 2: a framing error aborted the archive
fn exit_status(report: &ArchiveReport) -> ExitCode {
    if report.is_aborted() {
        ExitCode::from(2)
    } else if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Print the result of an extraction run.
///
/// Successful entries go to stdout, failures and aborts to stderr.
fn report_extraction(report: &ArchiveReport, cli: &Cli) {
    for entry in &report.entries {
        match &entry.status {
            EntryStatus::Extracted(_) => {
                if !cli.is_quiet() {
                    println!("  extracting: {}", entry.display_name());
                }
            }
            EntryStatus::Failed(e) => {
                if !cli.is_very_quiet() {
                    eprintln!("  failed:     {}: {}", entry.display_name(), e);
                }
            }
            EntryStatus::Listed => unreachable!("directory sink never lists"),
        }
    }

    report_abort(report);

    if !cli.is_quiet() {
        println!(
            "{} of {} entries extracted",
            report.succeeded(),
            report.declared_entries()
        );
    }
}

/// List the entries of a decoded archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Header fields plus a table of index, size and name
fn list_entries(report: &ArchiveReport, verbose: bool) {
    if verbose {
        let header = &report.header;
        println!("Magic:             {}", String::from_utf8_lossy(&header.magic));
        println!(
            "Directory:         {}",
            String::from_utf8_lossy(&header.dir_name)
        );
        println!(
            "Archive name:      {}",
            String::from_utf8_lossy(&header.file_name)
        );
        println!("Uncompressed size: {}", header.uncompressed_size);
        println!("File count:        {}", header.file_count);
        println!();
        println!("{:>10}  {:>5}  Name", "Length", "Index");
        println!("{}", "-".repeat(40));
    }

    let mut total = 0u64;
    for entry in &report.entries {
        if verbose {
            println!(
                "{:>10}  {:>5}  {}",
                entry.size,
                entry.index,
                entry.display_name()
            );
        } else {
            println!("{}", entry.display_name());
        }
        total += entry.size as u64;
    }

    if verbose {
        println!("{}", "-".repeat(40));
        println!("{:>10}  {:>5}  {} files", total, "", report.entries.len());
        println!(
            "Stream: {} declared, {} consumed",
            header_size(report),
            format_size(report.bytes_consumed)
        );
        if report.header.uncompressed_size as i64 != report.bytes_consumed as i64 {
            debug!(
                "declared uncompressed size {} differs from {} bytes consumed",
                report.header.uncompressed_size, report.bytes_consumed
            );
        }
    }

    report_abort(report);
}

fn report_abort(report: &ArchiveReport) {
    if let Some(e) = report.abort_error() {
        eprintln!(
            "uecrash: archive aborted after {} of {} entries: {}",
            report.entries.len(),
            report.declared_entries(),
            e
        );
    }
}

/// Declared uncompressed size, formatted; negative values shown as-is.
fn header_size(report: &ArchiveReport) -> String {
    match u64::try_from(report.header.uncompressed_size) {
        Ok(size) => format_size(size),
        Err(_) => report.header.uncompressed_size.to_string(),
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
