//! Fragment post-processing.
//!
//! Flattens and deduplicates the fragments collected by the scanner.

pub mod flatten;
pub mod value;

pub use flatten::*;
pub use value::{is_truthy, json_eq};
