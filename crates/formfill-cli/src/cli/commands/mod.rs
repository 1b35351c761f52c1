//! CLI command handlers, one per file.

mod classify;
mod run;
mod sanitize;

pub use classify::run_classify;
pub use run::{run_extract, ExtractArgs};
pub use sanitize::run_sanitize;
