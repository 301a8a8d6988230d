//! Execute command implementation.
//!
//! Reads a saved dedupe plan and applies it.

use super::dedupe::print_plan;
use super::App;
use crate::core::dedupe::load_plan;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Execute a plan file.
pub async fn execute_plan(app: &App, plan_file: &Path) -> Result<()> {
    println!("{}", "[EXEC] Executing plan...".bold().cyan());
    println!();

    if !plan_file.exists() {
        return Err(crate::Error::PathNotFound(plan_file.display().to_string()));
    }

    println!("[INFO] Loading plan: {}", plan_file.display());
    let plan = load_plan(plan_file)?;
    println!("  {} {}", "Plan:".bold(), plan.plan_id);
    println!("  {} {}", "Created:".bold(), plan.created_at);
    print_plan(&plan);

    if app.config.dry_run {
        println!("{}", "[DRY RUN] No file will be touched".bold().yellow());
    } else {
        println!("{}", "[WARNING] This will move files!".bold().yellow());
    }
    println!();

    let report = app.executor.execute(&plan).await;
    report.print_summary();
    Ok(())
}
