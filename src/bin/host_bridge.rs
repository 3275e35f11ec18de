//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin and
//! writes one `ResponseEnvelope` per command to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.
//!
//! The config file is `$RECIPE_SCOUT_CONFIG` when set, otherwise
//! `~/.config/recipe-scout/config.toml`.

use std::path::PathBuf;

use recipe_scout::host::stdio::run_stdio_bridge;
use recipe_scout::{RecipeService, ScoutConfig};

const CONFIG_ENV: &str = "RECIPE_SCOUT_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("recipe_scout=info,recipe_search=info")
            }),
        )
        .init();

    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(ScoutConfig::default_config_path);
    tracing::info!(config = %config_path.display(), "recipe-scout-host starting");

    let mut config = ScoutConfig::load_or_default(&config_path)?;
    config.apply_env_overrides();
    let service = RecipeService::new(config, Some(config_path))?;

    run_stdio_bridge(service).await.map_err(|e| {
        tracing::error!(error = %e, "recipe-scout-host exited with error");
        anyhow::anyhow!("recipe-scout-host failed: {e}")
    })?;

    tracing::info!("recipe-scout-host shut down cleanly");
    Ok(())
}
