//! Bookshelf application library
//!
//! Domain modules, text sanitization, and the process lifecycle that wires
//! them to storage and HTTP.

pub mod bootstrap;
pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
