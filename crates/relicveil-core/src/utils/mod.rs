//! Utility functions for string formatting.

pub mod format;

pub use format::{format_likes, truncate_string};
