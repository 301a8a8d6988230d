//! Utility modules.

pub mod fs;
pub mod lock;
