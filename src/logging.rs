//! Logging initialization with optional file output.

use sorng_core::{TransferConfig, TransferError, TransferResult};
use std::fs::{File, OpenOptions};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "info";

/// Build the level filter: `RUST_LOG` wins, then `log_level`, then `info`.
pub fn env_filter(config: &TransferConfig) -> TransferResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = config.log_level.as_deref().unwrap_or(DEFAULT_DIRECTIVE);
    EnvFilter::try_new(directive).map_err(|e| {
        TransferError::invalid_config(format!("Invalid log level '{}': {}", directive, e))
    })
}

fn open_log_file(config: &TransferConfig) -> TransferResult<Option<File>> {
    let Some(path) = config.log_file.as_ref() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| {
        TransferError::io_error(format!("Cannot open log file '{}': {}", path.display(), e))
    })?;
    Ok(Some(file))
}

/// Build the layered subscriber. Writes to `log_file` (no ANSI) when set,
/// stderr otherwise.
pub fn subscriber(
    config: &TransferConfig,
) -> TransferResult<impl Subscriber + Send + Sync + 'static> {
    let filter = env_filter(config)?;
    let file = open_log_file(config)?;

    let file_layer = file.map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_target(true)
    });
    let stderr_layer = if file_layer.is_none() {
        Some(fmt::layer().with_writer(std::io::stderr).with_target(true))
    } else {
        None
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer))
}

/// Install [`subscriber`] globally.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(config: &TransferConfig) -> TransferResult<bool> {
    Ok(subscriber(config)?.try_init().is_ok())
}
