use anyhow::Context;
use std::fs;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "logs/app.log";

/// Opens the append-only log sink and installs it as the process-wide
/// subscriber. Called exactly once, before the listener starts; the file
/// handle lives for the lifetime of the process.
pub(crate) fn init() -> anyhow::Result<()> {
    fs::create_dir_all(LOG_DIR).context("creating log directory")?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .with_context(|| format!("opening {}", LOG_FILE))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    Ok(())
}
