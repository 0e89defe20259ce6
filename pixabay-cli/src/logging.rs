use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pixabay_client::LoggingConfig;

/// Initialize structured logging based on configuration
///
/// Logs go to stderr (or the configured file) so search output on stdout
/// stays clean. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let log_level = parse_log_level(&config.level)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match parse_log_format(&config.format)? {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_line_number(true);

            if let Some(file_path) = &config.file_path {
                let file = open_log_file(file_path)?;
                registry.with(json_layer.with_writer(std::sync::Arc::new(file))).init();
            } else {
                registry.with(json_layer.with_writer(std::io::stderr)).init();
            }
        }
        LogFormat::Pretty => {
            let pretty_layer = fmt::layer().pretty().with_target(true).with_file(false);

            if let Some(file_path) = &config.file_path {
                let file = open_log_file(file_path)?;
                registry
                    .with(pretty_layer.with_ansi(false).with_writer(std::sync::Arc::new(file)))
                    .init();
            } else {
                registry.with(pretty_layer.with_writer(std::io::stderr)).init();
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

fn open_log_file(path: &str) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}

fn parse_log_format(format: &str) -> anyhow::Result<LogFormat> {
    match format.to_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" | "" => Ok(LogFormat::Pretty),
        _ => Err(anyhow::anyhow!("Invalid log format: {format} (expected json or pretty)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(parse_log_level("trace").is_ok());
        assert!(parse_log_level("debug").is_ok());
        assert!(parse_log_level("info").is_ok());
        assert!(parse_log_level("WARN").is_ok());
        assert!(parse_log_level("warning").is_ok());
        assert!(parse_log_level("error").is_ok());
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("json").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format("Pretty").unwrap(), LogFormat::Pretty);
        assert!(parse_log_format("xml").is_err());
    }
}
