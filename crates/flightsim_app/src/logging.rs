//! Logging initialisation.
//!
//! Structured logging flows through `tracing`. The configuration drives
//! three layers: a brief file sink (INFO and above), a detail file sink
//! (DEBUG and above), and an optional console layer whose verbosity can be
//! overridden through the standard `RUST_LOG` environment variable. The
//! master `enable_logging` switch turns the whole stack off.

use std::fs::File;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use flightsim_scenario::LogConfig;

/// Initialise the global subscriber from the log configuration.
///
/// # Errors
///
/// Fails if a log file cannot be created or a subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enable_logging {
        return Ok(());
    }

    for path in [&config.brief_log_file, &config.detail_log_file] {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
    }

    let brief = Arc::new(
        File::create(&config.brief_log_file)
            .with_context(|| format!("creating {}", config.brief_log_file.display()))?,
    );
    let detail = Arc::new(
        File::create(&config.detail_log_file)
            .with_context(|| format!("creating {}", config.detail_log_file.display()))?,
    );

    let console = config.console_output.then(|| {
        fmt::layer().with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(brief)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(detail)
                .with_filter(LevelFilter::DEBUG),
        )
        .with(console)
        .try_init()
        .map_err(|error| anyhow::anyhow!("installing tracing subscriber: {error}"))?;

    Ok(())
}
