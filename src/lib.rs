//! Media Housekeeper Library
//!
//! Classifies downloaded video files, ranks quality variants of the same
//! title and keeps a media library tidy.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
