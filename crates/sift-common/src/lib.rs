//! Shared infrastructure for the sift crates.
//!
//! - **Warnings** - deduplicated, colored diagnostics on stderr
//! - **Validation** - precondition checks that fail with [`validate::ValidationError`]

pub mod validate;
pub mod warning;
