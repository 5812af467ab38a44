//! Project-specific utilities live here.

pub mod sanitize;

pub use sanitize::{is_valid_identifier, sanitize};
