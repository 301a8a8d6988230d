//! Media Housekeeper CLI
//!
//! Classifies, deduplicates and tidies a video library.

use clap::Parser;
use media_housekeeper::cli::{
    args::{Cli, Commands},
    commands::{classify, clean, dedupe, execute, sort, App},
};
use media_housekeeper::models::config::load_config;
use media_housekeeper::utils::lock::AppLock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if cli.dry_run {
        config.dry_run = true;
    }

    // Held until the command finishes
    let _lock = AppLock::acquire(&config.lock_file)?;

    let app = App::new(config)?;

    // Run the appropriate command
    match cli.command {
        Commands::Sort => {
            sort::sort(&app).await?;
        }

        Commands::Dedupe { output, exclude } => {
            dedupe::dedupe(&app, output.as_deref(), &exclude).await?;
        }

        Commands::Execute { plan_file } => {
            execute::execute_plan(&app, &plan_file).await?;
        }

        Commands::Clean { skip_trailers } => {
            clean::clean(&app, skip_trailers).await?;
        }

        Commands::Classify { path } => {
            classify::classify(&app, &path).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_housekeeper=debug")
    } else {
        EnvFilter::new("media_housekeeper=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
