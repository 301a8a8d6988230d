//! Clean command implementation.

use super::App;
use crate::core::cleaner::{flatten_operations, prune_operations, trailer_operations};
use crate::Result;
use colored::Colorize;

/// Flatten title directories, prune small leftovers, then move loose trailers.
pub async fn clean(app: &App, skip_trailers: bool) -> Result<()> {
    println!("{}", "[CLEAN] Cleaning library...".bold().cyan());
    println!();

    let flatten = flatten_operations(&app.config);
    println!("  {} {}", "Nested files to flatten:".bold(), flatten.len());
    let report = app.executor.run(flatten).await;
    report.print_summary();
    println!();

    let prune = prune_operations(&app.config);
    println!("  {} {}", "Leftovers to prune:".bold(), prune.len());
    let report = app.executor.run(prune).await;
    report.print_summary();

    if !skip_trailers {
        println!();
        let trailers = trailer_operations(&app.config);
        println!("  {} {}", "Trailers to move:".bold(), trailers.len());
        let report = app.executor.run(trailers).await;
        report.print_summary();
    }
    Ok(())
}
