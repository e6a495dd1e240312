//! Contract with the external content validator.
//!
//! The validator receives a manifest describing the files of one submission
//! and where to write its reports, and answers with an overall status. It knows
//! files by path only; mapping back to file UUIDs is the caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use fcv_core::FileType;

/// One input file handed to the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    pub file_type: FileType,
    pub path: PathBuf,
    /// Where the validator writes messages about this file.
    pub report_file: Option<PathBuf>,
}

impl ManifestFile {
    pub fn new(file_type: FileType, path: impl Into<PathBuf>) -> Self {
        Self {
            file_type,
            path: path.into(),
            report_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub files: Vec<ManifestFile>,
    /// Where the validator writes messages about the submission as a whole.
    pub report_file: Option<PathBuf>,
    pub process_dir: Option<PathBuf>,
}

impl Manifest {
    pub fn new(files: Vec<ManifestFile>) -> Self {
        Self {
            files,
            report_file: None,
            process_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[serde(rename = "VALIDATION_SUCCESS")]
    Success,
    #[serde(rename = "VALIDATION_ERROR")]
    Error,
}

/// What the validator reports back for a whole manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub status: ValidationStatus,
    /// Set by read validators: whether the files were recognised as a paired read set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired: Option<bool>,
}

impl ValidationResponse {
    pub fn success() -> Self {
        Self {
            status: ValidationStatus::Success,
            paired: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: ValidationStatus::Error,
            paired: None,
        }
    }

    pub fn with_paired(mut self, paired: bool) -> Self {
        self.paired = Some(paired);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ValidationStatus::Success
    }
}

/// The external content validator.
///
/// Implementations write report files to the paths assigned in the manifest.
/// An `Err` means the validator itself failed; findings about the files are
/// reported through [`ValidationStatus::Error`] and the report files instead.
#[async_trait]
pub trait ContentValidator: Send + Sync {
    async fn validate(&self, manifest: &Manifest) -> anyhow::Result<ValidationResponse>;
}
