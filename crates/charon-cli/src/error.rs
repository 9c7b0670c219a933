//! Error types and handling for the CLI

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the mapping engine
    #[error("{0}")]
    Core(#[from] charon_core::Error),

    /// Error loading definition documents
    #[error("{0}")]
    Schema(#[from] charon_schemas::LoaderError),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Definition '{}' not found (known: {})", name, known)]
    DefinitionNotFound { name: String, known: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Schema(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidFormat { .. } => 5,
            Self::Config(_) => 6,
            Self::InvalidArgs(_) => 7,
            Self::DefinitionNotFound { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
///
/// Invalid definition documents list every violation on its own line.
pub fn format_error(error: &Error, use_color: bool) -> String {
    use colored::Colorize;

    let label = if use_color {
        "Error:".red().bold().to_string()
    } else {
        "Error:".to_string()
    };
    let mut message = format!("{} {}", label, error);

    if let Error::Schema(loader_error) = error {
        let violations = loader_error.violations();
        if violations.len() > 1 {
            for violation in violations {
                let line = format!("  - {}", violation);
                message.push('\n');
                if use_color {
                    message.push_str(&line.yellow().to_string());
                } else {
                    message.push_str(&line);
                }
            }
        }
    }

    message
}
