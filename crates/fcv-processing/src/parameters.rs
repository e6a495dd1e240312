//! Command-line parameter checks run before any workspace is staged.
//!
//! Nothing here returns `Err`: a missing file or an unsupported type is a
//! normal outcome that gets reported back to the submitter, so every problem
//! found is collected as an Error result.

use std::path::Path;

use fcv_core::{FileType, ParameterFailure, SingleValidationResult, SubmissionRequest};

/// One Error result per file whose path is missing or points at a directory.
pub fn validate_file_existence(request: &SubmissionRequest) -> Vec<SingleValidationResult> {
    request
        .files
        .iter()
        .filter(|file| {
            let path = Path::new(&file.file_path);
            !path.exists() || path.is_dir()
        })
        .map(|file| {
            tracing::debug!(
                file_uuid = %file.file_uuid,
                path = %file.file_path,
                "Submitted file not found"
            );
            SingleValidationResult::error(
                ParameterFailure::FileNotFound {
                    path: file.file_path.clone(),
                }
                .to_string(),
                file.file_uuid.clone(),
            )
        })
        .collect()
}

/// At most one Error result for the whole submission, attributed to every file.
pub fn validate_file_type(request: &SubmissionRequest) -> Option<SingleValidationResult> {
    if FileType::is_supported(&request.file_type) {
        return None;
    }

    tracing::debug!(file_type = %request.file_type, "Unsupported file type");
    Some(SingleValidationResult::error(
        ParameterFailure::FileTypeNotSupported {
            file_type: request.file_type.clone(),
        }
        .to_string(),
        request.joined_file_uuids(", "),
    ))
}

/// All parameter problems; empty iff the submission can be handed to the validator.
pub fn validate_parameters(request: &SubmissionRequest) -> Vec<SingleValidationResult> {
    let mut failures = validate_file_existence(request);
    failures.extend(validate_file_type(request));
    failures
}
