//! Logging setup.
//!
//! Console output always goes to stderr so the stdio transport keeps stdout
//! for protocol messages. When a log directory is configured, JSON lines are
//! also written to a daily rolling file through a non-blocking writer.

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::LoggingConfig;

/// Parse a level name, defaulting to `info`.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it for the
/// lifetime of the process. Returns `None` when file logging is off or the
/// appender could not be created.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(&config.level).into());

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let mut file_error = None;
    let (file_layer, guard) = match config.directory.as_ref().map(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("kv-mcp-gateway")
            .filename_suffix("log")
            .max_log_files(7)
            .build(dir)
    }) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    let init = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = init {
        eprintln!("Logging already initialized: {e}");
    }
    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {}", e);
    }
    if let Some(dir) = &config.directory {
        if guard.is_some() {
            tracing::info!(log_dir = %dir.display(), "File logging enabled");
        }
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warning "), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
