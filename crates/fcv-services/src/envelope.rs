//! Per-file result envelopes and their routing.

use fcv_core::{FileRequest, ResultEnvelope, SingleValidationResult};

pub const ROUTING_KEY_SUCCESS: &str = "validation.success";
pub const ROUTING_KEY_ERROR: &str = "validation.error";

/// Envelope for `file` carrying its results under its validation result id and version.
pub fn build_envelope(file: &FileRequest, results: Vec<SingleValidationResult>) -> ResultEnvelope {
    ResultEnvelope::new(
        results,
        file.validation_result_version,
        file.validation_result_uuid.clone(),
    )
}

/// `validation.error` if any result is an Error, `validation.success` otherwise.
pub fn routing_key_for(envelope: &ResultEnvelope) -> &'static str {
    if envelope.has_errors() {
        ROUTING_KEY_ERROR
    } else {
        ROUTING_KEY_SUCCESS
    }
}

/// Parameter failures that apply to `file`, including submission-wide ones
/// whose entity lists it.
pub fn failures_for_file(
    failures: &[SingleValidationResult],
    file: &FileRequest,
) -> Vec<SingleValidationResult> {
    failures
        .iter()
        .filter(|failure| failure.concerns(&file.file_uuid))
        .cloned()
        .collect()
}
