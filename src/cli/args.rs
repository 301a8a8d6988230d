//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media Housekeeper - classify, deduplicate and tidy a video library
#[derive(Parser, Debug)]
#[command(name = "housekeeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Dry run - log moves without touching any file
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to config.toml
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move downloads into the library
    Sort,

    /// Resolve duplicate copies of the same title
    Dedupe {
        /// Write the plan here instead of executing it
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Titles to leave alone (repeatable)
        #[arg(long, value_name = "TITLE")]
        exclude: Vec<String>,
    },

    /// Execute a saved dedupe plan
    Execute {
        /// Path to the plan.json file
        #[arg(value_name = "PLAN_FILE")]
        plan_file: PathBuf,
    },

    /// Prune small leftovers and file trailers
    Clean {
        /// Do not move trailers
        #[arg(long)]
        skip_trailers: bool,
    },

    /// Classify a single file and print the record
    Classify {
        /// Video file to classify
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}
