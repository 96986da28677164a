//! Logging configuration for VerseRAG

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

/// Initialize logging from the `[logging]` config section.
///
/// `verbose` (the CLI flag) overrides the configured level with debug.
pub fn init_from_config(config: &LoggingConfig, verbose: bool) -> Result<()> {
    if config.backtrace {
        std::env::set_var("RUST_BACKTRACE", "1");
    }
    init_logging_with_level(resolve_log_level(verbose, config))
}

/// Pick the effective log level: the CLI flag wins over the config file
pub fn resolve_log_level(verbose: bool, config: &LoggingConfig) -> &str {
    if verbose {
        "debug"
    } else {
        &config.level
    }
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<()> {
    // Create logs directory if it doesn't exist
    let logs_dir = Path::new("logs");
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::new(format!("{level},verserag={level}"));

    // File appender for all logs
    let file_appender = tracing_appender::rolling::daily("logs", "verserag.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        "Logging initialized with level: {} - console and file output enabled",
        level
    );
    tracing::info!("Log files will be saved to: logs/verserag.log.YYYY-MM-DD");

    // The guard must outlive the process or buffered log lines are lost
    std::mem::forget(guard);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_is_used() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            backtrace: false,
        };
        assert_eq!(resolve_log_level(false, &config), "warn");
    }

    #[test]
    fn test_verbose_flag_overrides_config() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            backtrace: false,
        };
        assert_eq!(resolve_log_level(true, &config), "debug");
    }
}
