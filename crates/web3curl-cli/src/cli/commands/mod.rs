//! CLI command handlers, one per file.

mod fetch;

pub use fetch::run_fetch;
