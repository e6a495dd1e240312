//! Report file parsing.
//!
//! The validator writes one report per input file plus one for the submission.
//! Lines starting with `ERROR: ` are findings; everything else is informational
//! and skipped. Submission-wide findings (e.g. too few paired reads) apply to
//! every file, so they are appended to each file's own results.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use fcv_core::{ContentValidationError, FileHandleError, SingleValidationResult};

use crate::manifest::Manifest;

pub const ERROR_MARKER: &str = "ERROR: ";

/// Error results for every `ERROR: ` line of `report_file`, attributed to `file_uuid`.
pub async fn parse_report_file(
    file_uuid: &str,
    report_file: &Path,
) -> Result<Vec<SingleValidationResult>, FileHandleError> {
    let report_error = |source: io::Error| FileHandleError::ReportFile {
        file_uuid: file_uuid.to_string(),
        path: report_file.to_path_buf(),
        source,
    };

    let file = File::open(report_file).await.map_err(report_error)?;
    let mut lines = BufReader::new(file).lines();

    let mut results = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(report_error)? {
        if let Some(message) = line.strip_prefix(ERROR_MARKER) {
            results.push(SingleValidationResult::error(message, file_uuid));
        }
    }

    tracing::debug!(
        file_uuid = %file_uuid,
        report = %report_file.display(),
        errors = results.len(),
        "Parsed report file"
    );

    Ok(results)
}

/// The file's own findings followed by the submission-wide findings.
///
/// `files_by_uuid` maps each file UUID of the run to its index in
/// `manifest.files`.
pub async fn parse_result_files(
    manifest: &Manifest,
    files_by_uuid: &HashMap<String, usize>,
    file_uuid: &str,
) -> Result<Vec<SingleValidationResult>, ContentValidationError> {
    let entry = files_by_uuid
        .get(file_uuid)
        .and_then(|&index| manifest.files.get(index))
        .ok_or_else(|| ContentValidationError::SubmissionFileNotFound {
            file_uuid: file_uuid.to_string(),
        })?;

    let file_report = assigned_report(file_uuid, entry.report_file.as_ref())?;
    let submission_report = assigned_report(file_uuid, manifest.report_file.as_ref())?;

    let mut results = parse_report_file(file_uuid, file_report).await?;
    results.extend(parse_report_file(file_uuid, submission_report).await?);

    Ok(results)
}

fn assigned_report<'a>(
    file_uuid: &str,
    report_file: Option<&'a PathBuf>,
) -> Result<&'a Path, FileHandleError> {
    report_file
        .map(PathBuf::as_path)
        .ok_or_else(|| FileHandleError::ReportFile {
            file_uuid: file_uuid.to_string(),
            path: PathBuf::new(),
            source: io::Error::new(io::ErrorKind::NotFound, "no report file was assigned"),
        })
}
