use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "ATHENA_LOG";
const DEFAULT_DIRECTIVE: &str = "athena=info";

pub fn log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Failed to get cache directory")?
        .join("athena");
    std::fs::create_dir_all(&dir).context("Failed to create log directory")?;
    Ok(dir.join("athena.log"))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Log to a file; the terminal belongs to the UI.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter())
        .try_init()
        .context("Logging already initialized")?;

    Ok(path)
}
