//! CLI for the chunkq chunk scheduler.

mod commands;

use anyhow::Result;
use chunkq_core::config::{self, BodyFormat, DataType};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_chunks, run_completions, run_show_config};

/// Top-level CLI for chunkq.
#[derive(Debug, Parser)]
#[command(name = "chunkq")]
#[command(about = "chunkq: POST batches of identifiers to an endpoint with bounded concurrency and retries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send every chunk to URL; one JSON line per successful chunk.
    Run(RunArgs),

    /// Show the config file path and the effective configuration.
    Config,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Endpoint receiving one POST per chunk.
    pub url: String,

    #[command(flatten)]
    pub source: ChunkSourceArgs,

    /// Maximum requests in flight (overrides config).
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Failures tolerated per chunk before giving up (overrides config).
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Response shape: json or text.
    #[arg(long, value_name = "TYPE")]
    pub data_type: Option<DataType>,

    /// Request body encoding: form or json.
    #[arg(long, value_name = "FORMAT")]
    pub body_format: Option<BodyFormat>,

    /// Write result lines to PATH instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Log every chunk event at info level.
    #[arg(long)]
    pub verbose: bool,
}

/// Exactly one chunk source.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ChunkSourceArgs {
    /// Inline JSON array of chunks, e.g. '[[1,2],[3]]'.
    #[arg(long, value_name = "JSON")]
    pub chunks: Option<String>,

    /// File holding a JSON array of chunks.
    #[arg(long, value_name = "PATH")]
    pub chunks_file: Option<PathBuf>,

    /// URL returning a JSON array of chunks.
    #[arg(long, value_name = "URL")]
    pub chunks_url: Option<String>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_chunks(&cfg, args).await?;
            }
            CliCommand::Config => run_show_config().await?,
            CliCommand::Completions { shell } => run_completions(shell).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
