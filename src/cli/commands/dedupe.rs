//! Dedupe command implementation.
//!
//! Classifies the whole library, groups copies of the same title and either
//! executes the resulting plan or saves it for review.

use super::App;
use crate::core::dedupe::{resolve_duplicates, save_plan};
use crate::core::scanner::{scan_roots, ScanOptions};
use crate::models::plan::{Disposition, Plan};
use crate::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Run the dedupe command.
pub async fn dedupe(app: &App, output: Option<&Path>, exclude: &[String]) -> Result<()> {
    println!("{}", "[DEDUPE] Looking for duplicates...".bold().cyan());
    println!();

    let config = &app.config;
    let scan = scan_roots(
        &config.final_media_dirs(),
        &ScanOptions {
            min_size: config.min_file_size,
            include_extras: true,
        },
    );
    let paths: Vec<PathBuf> = scan.videos.into_iter().map(|v| v.path).collect();
    println!("  {} {}", "Videos found:".bold(), paths.len());

    let excluded: HashSet<String> = exclude.iter().cloned().collect();
    let outcome = app.classifier.classify_all(&paths, &excluded).await;

    let mut plan = resolve_duplicates(&outcome.records);
    plan.unclassified = outcome.failures;
    print_plan(&plan);

    match output {
        Some(path) => {
            save_plan(&plan, path)?;
            println!(
                "{} {}",
                "[OK] Plan saved to:".bold().green(),
                path.display()
            );
            println!();
            println!("{}", "[Next Steps]".bold().yellow());
            println!(
                "  To apply it: {}",
                format!("housekeeper execute {}", path.display()).cyan()
            );
        }
        None => {
            let report = app.executor.execute(&plan).await;
            report.print_summary();
        }
    }
    Ok(())
}

/// Print the groups that contain duplicates.
pub fn print_plan(plan: &Plan) {
    println!();
    println!("{}", "[Plan Summary]".bold().green());
    for group in plan.duplicate_groups() {
        println!("  {}", group.label().bold());
        for action in &group.actions {
            let tag = match action.disposition {
                Disposition::Keep => "keep".green(),
                Disposition::Demote => "demote".yellow(),
                Disposition::Delete => "delete".red(),
            };
            println!("    [{}] {:>5} {}", tag, action.rank, action.source.display());
        }
    }
    println!("  {} {}", "Groups:".bold(), plan.groups.len());
    println!("  {} {}", "Keep:".bold(), plan.count(Disposition::Keep));
    println!("  {} {}", "Demote:".bold(), plan.count(Disposition::Demote));
    println!("  {} {}", "Delete:".bold(), plan.count(Disposition::Delete));
    if !plan.unclassified.is_empty() {
        println!("  {} {}", "Unclassified:".bold().yellow(), plan.unclassified.len());
        for item in &plan.unclassified {
            println!("    - {} ({})", item.source.display(), item.reason);
        }
    }
    println!();
}
