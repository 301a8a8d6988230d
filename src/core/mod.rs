//! Core business logic modules.

pub mod classifier;
pub mod cleaner;
pub mod dedupe;
pub mod executor;
pub mod normalizer;
pub mod parser;
pub mod ranker;
pub mod resolver;
pub mod scanner;
pub mod sorter;
