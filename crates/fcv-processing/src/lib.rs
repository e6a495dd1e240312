//! File content validation processing
//!
//! This crate stages per-run workspaces, drives the external content validator
//! and turns its report files into validation results.

pub mod command;
pub mod manifest;
pub mod orchestrator;
pub mod parameters;
pub mod report;
pub mod workspace;

// Re-export commonly used types
pub use command::CommandValidator;
pub use manifest::{ContentValidator, Manifest, ManifestFile, ValidationResponse, ValidationStatus};
pub use orchestrator::{ValidationOrchestrator, ValidationRun, SUBMISSION_REPORT_FILE};
pub use parameters::{validate_file_existence, validate_file_type, validate_parameters};
pub use report::{parse_report_file, parse_result_files};
pub use workspace::{Workspace, WorkspaceLayout};
