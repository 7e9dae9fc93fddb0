//! Logging and tracing initialization.

use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// When [`LoggingConfig::file`] is set, log output is appended to that file
/// (without ANSI escapes); otherwise logs go to stderr. A file that cannot
/// be opened falls back to stderr so a pipeline run is never silent.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if let Some(path) = &config.file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let builder = fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false);
                if config.json {
                    tracing::subscriber::set_global_default(builder.json().finish()).ok();
                } else {
                    tracing::subscriber::set_global_default(builder.finish()).ok();
                }
                return;
            }
            Err(e) => {
                eprintln!("failed to open log file {}: {e}", path.display());
            }
        }
    }

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
