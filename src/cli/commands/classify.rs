//! Classify command implementation.

use super::App;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Classify one file and print the record as JSON.
pub async fn classify(app: &App, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }

    let record = app.classifier.classify(path).await?;
    println!("{} {}", "[OK]".bold().green(), record.display_title().bold());
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
