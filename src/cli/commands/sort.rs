//! Sort command implementation.
//!
//! Scans the download directories, classifies every video and files it
//! (with its release folder, or its sidecars when loose) into the library.

use super::App;
use crate::core::scanner::{scan_roots, ScanOptions};
use crate::core::sorter::sort_operations;
use crate::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Run the sort command.
pub async fn sort(app: &App) -> Result<()> {
    println!("{}", "[SORT] Sorting downloads...".bold().cyan());
    println!();

    let config = &app.config;
    if config.unsorted_media_dirs.is_empty() {
        println!("{}", "[WARNING] No unsorted_media_dirs configured".yellow());
        return Ok(());
    }

    let scan = scan_roots(
        &config.unsorted_media_dirs,
        &ScanOptions {
            min_size: config.hd_media_file_size,
            include_extras: false,
        },
    );
    let paths: Vec<PathBuf> = scan.videos.into_iter().map(|v| v.path).collect();
    println!("  {} {}", "Videos found:".bold(), paths.len());

    let outcome = app.classifier.classify_all(&paths, &HashSet::new()).await;
    for failure in &outcome.failures {
        println!(
            "  {} {} ({})",
            "[SKIP]".yellow(),
            failure.source.display(),
            failure.reason
        );
    }

    let ops = sort_operations(&outcome.records, &config.unsorted_media_dirs);
    println!("  {} {}", "Operations:".bold(), ops.len());
    println!();

    let report = app.executor.run(ops).await;
    report.print_summary();
    Ok(())
}
