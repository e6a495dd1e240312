//! Error types module
//!
//! Two channels are kept apart here. Problems with the submitted data are not
//! errors at all: they become `SingleValidationResult`s and travel through the
//! ordinary return path. The enums in this module cover defects only: malformed
//! command-line parameters, filesystem failures, and an external validator that
//! blew up instead of reporting.
//!
//! `ParameterFailure` is the exception to the rule. It is the closed set of
//! user-facing message templates rendered into validation results, and it is a
//! `thiserror` enum purely so the templates live next to the other messages.

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for expected errors like malformed input
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported by the binary
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_HANDLE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether rerunning the same invocation could succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Templates for user-input problems. Rendered into `SingleValidationResult`
/// messages, never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterFailure {
    #[error("File not found with target path: {path}")]
    FileNotFound { path: String },

    #[error("File type is not supported: {file_type}")]
    FileTypeNotSupported { file_type: String },

    #[error("File was not validated because the submission failed parameter validation")]
    SubmissionRejected,
}

/// Malformed `key=value` parameter strings.
///
/// `entry` is the zero-based position of the file entry in the `;` separated list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("No file parameters were supplied")]
    NoFiles,

    #[error("Duplicate key '{key}' in file entry {entry}")]
    DuplicateKey { key: String, entry: usize },

    #[error("Malformed field '{field}' in file entry {entry}: expected key=value")]
    MalformedField { field: String, entry: usize },

    #[error("Unknown key '{key}' in file entry {entry}")]
    UnknownKey { key: String, entry: usize },

    #[error("Missing key '{key}' in file entry {entry}")]
    MissingKey { key: &'static str, entry: usize },

    #[error("Invalid validationResultVersion '{value}' in file entry {entry}: expected a non-negative integer")]
    InvalidVersion { value: String, entry: usize },
}

/// Filesystem failures. Every variant carries the offending path or file id.
#[derive(Debug, thiserror::Error)]
pub enum FileHandleError {
    #[error("invalid report directory: {}", path.display())]
    InvalidReportDir { path: PathBuf },

    #[error("Missing output directory.")]
    MissingOutputDir,

    #[error("Unable to create directory: {segment}")]
    InvalidPathSegment { segment: String },

    #[error("Unable to create directory: {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to empty directory {}", path.display())]
    EmptyDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not process the validation report file for file with id: {file_uuid}. The original cause was: {source}")]
    ReportFile {
        file_uuid: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of a validation run that indicate a caller, deployment or
/// external validator defect.
#[derive(Debug, thiserror::Error)]
pub enum ContentValidationError {
    #[error("Failed to initialise validator. {0}")]
    ExecutorInit(String),

    #[error("Could not find submission file for data file with ID: {file_uuid}")]
    SubmissionFileNotFound { file_uuid: String },

    #[error("File type is not supported: {file_type}")]
    UnsupportedFileType { file_type: String },

    #[error("Validation error has happened: {0}")]
    Validator(#[source] anyhow::Error),

    #[error(transparent)]
    FileHandle(#[from] FileHandleError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    #[error(transparent)]
    Validation(#[from] ContentValidationError),

    #[error(transparent)]
    FileHandle(#[from] FileHandleError),

    #[error("Failed to publish validation message with routing key {routing_key}: {source}")]
    Dispatch {
        routing_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Get the error type name for log output
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Parameters(_) => "Parameters",
            AppError::Validation(ContentValidationError::FileHandle(_)) => "FileHandle",
            AppError::Validation(_) => "Validation",
            AppError::FileHandle(_) => "FileHandle",
            AppError::Dispatch { .. } => "Dispatch",
            AppError::Config(_) => "Config",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::Parameters(_) => ("INVALID_PARAMETERS", false, LogLevel::Warn),
        AppError::Validation(ContentValidationError::FileHandle(_)) | AppError::FileHandle(_) => {
            ("FILE_HANDLE_ERROR", true, LogLevel::Error)
        }
        AppError::Validation(ContentValidationError::Validator(_)) => {
            ("VALIDATOR_FAILED", true, LogLevel::Error)
        }
        AppError::Validation(_) => ("VALIDATION_SETUP_ERROR", false, LogLevel::Error),
        AppError::Dispatch { .. } => ("DISPATCH_ERROR", true, LogLevel::Error),
        AppError::Config(_) => ("CONFIG_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }
}
