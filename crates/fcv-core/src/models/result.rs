//! Validation results and the outbound envelope consumed by the aggregator.
//!
//! Field names and enum spellings follow the aggregator's JSON contract, and
//! empty fields are left out of the serialized form.

use serde::{Deserialize, Serialize};

/// Identity of the component that produced a validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationAuthor {
    Core,
    Taxonomy,
    Ena,
    Eva,
    Biosamples,
    BioStudies,
    ArrayExpress,
    Metabolights,
    Pride,
    FileReference,
    FileContent,
    JsonSchema,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleValidationResultStatus {
    #[default]
    Pending,
    Pass,
    Warning,
    Error,
}

/// One reported fact about one logical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleValidationResult {
    pub validation_author: ValidationAuthor,
    pub validation_status: SingleValidationResultStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub entity_uuid: String,
}

impl SingleValidationResult {
    pub fn pass(entity_uuid: impl Into<String>) -> Self {
        Self {
            validation_author: ValidationAuthor::FileContent,
            validation_status: SingleValidationResultStatus::Pass,
            message: String::new(),
            entity_uuid: entity_uuid.into(),
        }
    }

    pub fn error(message: impl Into<String>, entity_uuid: impl Into<String>) -> Self {
        Self {
            validation_author: ValidationAuthor::FileContent,
            validation_status: SingleValidationResultStatus::Error,
            message: message.into(),
            entity_uuid: entity_uuid.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.validation_status == SingleValidationResultStatus::Error
    }

    /// Whether this result concerns `file_uuid`, either directly or as part of
    /// a `", "` joined submission-level entity list.
    pub fn concerns(&self, file_uuid: &str) -> bool {
        self.entity_uuid == file_uuid || self.entity_uuid.split(", ").any(|e| e == file_uuid)
    }
}

/// All results for one (validationResultUUID, validationResultVersion) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub single_validation_results: Vec<SingleValidationResult>,
    pub validation_result_version: u32,
    #[serde(rename = "validationResultUUID")]
    pub validation_result_uuid: String,
    pub validation_author: ValidationAuthor,
}

impl ResultEnvelope {
    pub fn new(
        single_validation_results: Vec<SingleValidationResult>,
        validation_result_version: u32,
        validation_result_uuid: impl Into<String>,
    ) -> Self {
        Self {
            single_validation_results,
            validation_result_version,
            validation_result_uuid: validation_result_uuid.into(),
            validation_author: ValidationAuthor::FileContent,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.single_validation_results.iter().any(|r| r.is_error())
    }
}
