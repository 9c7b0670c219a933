//! Logging setup for the Charon CLI
//!
//! Events go to stderr so that command output on stdout stays machine readable.
//! Every invocation gets a run id recorded on its root span.

use crate::config::LogSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

static RUN_ID: OnceLock<String> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `warn` or `charon_core=trace`
    pub level: String,
    pub format: LogFormat,
    /// Colored output when stderr is a terminal
    pub console: bool,
    pub thread_ids: bool,
    pub source_location: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
    Json,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the configuration file section; its level only counts without `-v`
    pub fn apply_settings(&mut self, settings: &LogSettings, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
            self.format = format;
        }
    }

    /// `RUST_LOG` and `CHARON_LOG_FORMAT` override everything else
    pub fn merge_with_env(&mut self) {
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("CHARON_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Invalid CHARON_LOG_FORMAT '{}', using {:?}", format, self.format),
            }
        }
    }
}

/// Initialize the global subscriber and the run id
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("invalid log filter '{}': {}", config.level, e)))?;
    let ansi = config.console && std::io::stderr().is_terminal();

    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish(),
        ),
        LogFormat::Full => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish(),
        ),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let run_id = run_id();
    tracing::debug!(run_id = %run_id, config = ?config, "logging initialized");
    Ok(())
}

pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Run id of this invocation, generated on first use
pub fn run_id() -> &'static str {
    RUN_ID.get_or_init(generate_run_id)
}

/// Root span of a command
pub fn command_span(command: &str) -> Span {
    tracing::info_span!(
        "command",
        command = command,
        run_id = run_id(),
        duration_ms = field::Empty,
    )
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// Records the elapsed time on its span when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str, span: Span) -> Self {
            Self {
                start: Instant::now(),
                span,
                operation: operation.to_string(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.thread_ids);
    }

    #[test]
    fn test_settings_level_only_without_verbosity() {
        let settings = LogSettings {
            level: Some("charon_core=debug".to_string()),
            format: Some("json".to_string()),
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.apply_settings(&settings, 0);
        assert_eq!(quiet.level, "charon_core=debug");
        assert_eq!(quiet.format, LogFormat::Json);

        let mut verbose = LoggingConfig::from_verbosity(1);
        verbose.apply_settings(&settings, 1);
        assert_eq!(verbose.level, "info");
    }

    #[test]
    fn test_run_id_is_stable() {
        let first = run_id();
        assert!(first.starts_with("run_"));
        assert_eq!(first, run_id());
        assert_ne!(generate_run_id(), generate_run_id());
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("xml"), None);
    }
}
