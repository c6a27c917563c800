// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerPreferences {
    /// Whether to collect detailed token metrics
    pub collect_detailed_metrics: bool,

    /// Whether to track per-type usage counts
    pub track_type_usage: bool,

    /// Whether to log token count statistics after each run
    pub log_token_statistics: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,
}

impl Default for TokenizerPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var("DESCENT_TOKENIZER_DETAILED_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            track_type_usage: env::var("DESCENT_TOKENIZER_TRACK_TYPE_USAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_token_statistics: env::var("DESCENT_TOKENIZER_LOG_STATISTICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var("DESCENT_TOKENIZER_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadePreferences {
    /// Whether to log parse lifecycle events
    pub log_parse_events: bool,

    /// Whether to include token values in error messages
    pub include_token_values_in_errors: bool,
}

impl Default for FacadePreferences {
    fn default() -> Self {
        Self {
            log_parse_events: env::var("DESCENT_FACADE_LOG_PARSE_EVENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_token_values_in_errors: env::var("DESCENT_FACADE_INCLUDE_TOKEN_VALUES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level (within security constraints)
    /// Note: Security events will still be logged regardless of this setting
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to include source context in log messages
    pub include_source_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("DESCENT_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("DESCENT_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("DESCENT_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("DESCENT_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_source_context: env::var("DESCENT_LOGGING_INCLUDE_SOURCE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }

    /// Convert from events::LogLevel for compatibility
    pub fn from_events_log_level(level: crate::logging::events::LogLevel) -> Self {
        match level {
            crate::logging::events::LogLevel::Error => LogLevel::Error,
            crate::logging::events::LogLevel::Warning => LogLevel::Warning,
            crate::logging::events::LogLevel::Info => LogLevel::Info,
            crate::logging::events::LogLevel::Debug => LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tokenizer: TokenizerPreferences,
    pub facade: FacadePreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from a TOML file, falling back to defaults for
    /// missing sections and keys
    pub fn load_from_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| RuntimeConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read preferences file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse preferences file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Environment variable names for configuration
pub mod env_vars {
    // Tokenizer
    pub const TOKENIZER_DETAILED_METRICS: &str = "DESCENT_TOKENIZER_DETAILED_METRICS";
    pub const TOKENIZER_TRACK_TYPE_USAGE: &str = "DESCENT_TOKENIZER_TRACK_TYPE_USAGE";
    pub const TOKENIZER_LOG_STATISTICS: &str = "DESCENT_TOKENIZER_LOG_STATISTICS";
    pub const TOKENIZER_INCLUDE_POSITIONS: &str = "DESCENT_TOKENIZER_INCLUDE_POSITIONS";

    // Facade
    pub const FACADE_LOG_PARSE_EVENTS: &str = "DESCENT_FACADE_LOG_PARSE_EVENTS";
    pub const FACADE_INCLUDE_TOKEN_VALUES: &str = "DESCENT_FACADE_INCLUDE_TOKEN_VALUES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "DESCENT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "DESCENT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "DESCENT_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "DESCENT_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "DESCENT_LOGGING_INCLUDE_SOURCE_CONTEXT";
}
