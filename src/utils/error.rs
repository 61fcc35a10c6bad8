use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a UI automation driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    #[error("Element reference is stale")]
    Stale,

    #[error("No element matches selector '{selector}'")]
    NotFound { selector: String },

    #[error("Timed out after {timeout:?} waiting for '{selector}'")]
    Timeout { selector: String, timeout: Duration },

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Browser session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Stale handles, missing nodes and expired waits are worth one more look
    /// after the list has been re-resolved.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::Stale | DriverError::NotFound { .. } | DriverError::Timeout { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Driver error: {0}")]
    DriverError(#[from] DriverError),

    #[error("Could not parse '{input}': {reason}")]
    ParseError { input: String, reason: String },

    #[error("Unknown layer kind: '{classes}'")]
    UnknownLayerKind { classes: String },

    #[error("Unknown selection detail layout: '{classes}'")]
    UnknownPanelLayout { classes: String },

    #[error("Required field '{field}' is missing")]
    MissingFieldError { field: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {message}")]
    TaskError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Transient,
    Parse,
    Configuration,
    Io,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        EtlError::ParseError {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            EtlError::DriverError(e) => e.is_transient(),
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::DriverError(e) if e.is_transient() => ErrorCategory::Transient,
            EtlError::DriverError(_) | EtlError::TaskError { .. } => ErrorCategory::Fatal,
            EtlError::ParseError { .. }
            | EtlError::UnknownLayerKind { .. }
            | EtlError::UnknownPanelLayout { .. }
            | EtlError::MissingFieldError { .. } => ErrorCategory::Parse,
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::ZipError(_)
            | EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Parse => ErrorSeverity::Low,
            ErrorCategory::Transient => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Fatal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transient => {
                "The catalog was still rendering; re-run or raise browser.wait_timeout_seconds"
            }
            ErrorCategory::Parse => {
                "The catalog markup or values changed; check the logged record in the browser"
            }
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and the referenced environment variables"
            }
            ErrorCategory::Io => "Check that the output directory exists and is writable",
            ErrorCategory::Fatal => {
                "Check that Chrome is installed and that the site is reachable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Io => format!("Could not read or write output: {}", self),
            ErrorCategory::Fatal => format!("Scraping session failed: {}", self),
            ErrorCategory::Transient | ErrorCategory::Parse => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
pub type DriverResult<T> = std::result::Result<T, DriverError>;
