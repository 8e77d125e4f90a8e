//! CLI command handlers, one file per command.

mod completions;
mod config;
mod run;

pub use completions::run_completions;
pub use config::run_show_config;
pub use run::run_chunks;

#[cfg(test)]
pub(crate) use run::{inline_chunks, result_line};
