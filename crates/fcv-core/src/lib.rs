//! File content validator core library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by the processing, dispatch and command-line components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ValidatorConfig;
pub use error::{
    AppError, ContentValidationError, ErrorMetadata, FileHandleError, LogLevel, ParameterError,
    ParameterFailure,
};
pub use models::{
    FileRequest, FileType, ResultEnvelope, SingleValidationResult, SingleValidationResultStatus,
    SubmissionRequest, ValidationAuthor,
};
