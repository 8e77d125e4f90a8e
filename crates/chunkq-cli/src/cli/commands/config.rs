//! `chunkq config` – show where the config lives and what it resolves to.

use anyhow::{Context, Result};
use chunkq_core::config;

pub async fn run_show_config() -> Result<()> {
    let path = config::config_path()?;
    let cfg = config::load_or_init_at(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    println!("config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
