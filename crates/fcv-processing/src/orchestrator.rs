//! Validation orchestration: build manifest → stage workspace → assign report
//! paths → invoke the external validator.
//!
//! A run either completes with the validator's response or fails with a
//! [`ContentValidationError`]. Findings about the files are part of a completed
//! run and are read back through [`ValidationRun`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fcv_core::{ContentValidationError, SingleValidationResult, SubmissionRequest};

use crate::manifest::{ContentValidator, Manifest, ManifestFile, ValidationResponse};
use crate::report::parse_result_files;
use crate::workspace::{report_file_path, Workspace, WorkspaceLayout};

/// Name of the submission-wide report inside the validate directory.
pub const SUBMISSION_REPORT_FILE: &str = "file-content-validation.report";
pub const REPORT_SUFFIX: &str = ".report";

pub struct ValidationOrchestrator {
    validator: Arc<dyn ContentValidator>,
    layout: WorkspaceLayout,
}

impl ValidationOrchestrator {
    pub fn new(validator: Arc<dyn ContentValidator>, layout: WorkspaceLayout) -> Self {
        Self { validator, layout }
    }

    /// Run the external validator over every file of `request`.
    ///
    /// The request is expected to have passed parameter validation; an
    /// unsupported file type or a blank submission UUID at this point is a
    /// caller defect and fails the run.
    #[tracing::instrument(skip(self, request), fields(
        submission_uuid = %request.submission_uuid,
        file_type = %request.file_type,
        files = request.files.len()
    ))]
    pub async fn handle_file_content_validation(
        &self,
        request: &SubmissionRequest,
    ) -> Result<ValidationRun, ContentValidationError> {
        let (mut manifest, files_by_uuid) = build_manifest(request)?;

        let file_uuids: Vec<&str> = request.file_uuids().collect();
        let workspace = Workspace::create(&self.layout, &request.submission_uuid, &file_uuids)?;

        assign_report_paths(&mut manifest, &workspace)?;

        tracing::debug!("Invoking external validator");
        let response = self.validator.validate(&manifest).await.map_err(|e| {
            tracing::error!(error = %e, "External validator failed");
            ContentValidationError::Validator(e)
        })?;

        tracing::info!(
            status = ?response.status,
            paired = ?response.paired,
            "Validation response received"
        );

        Ok(ValidationRun {
            workspace,
            manifest,
            files_by_uuid,
            response,
        })
    }
}

/// Manifest entries in request order plus the file UUID → entry index map.
fn build_manifest(
    request: &SubmissionRequest,
) -> Result<(Manifest, HashMap<String, usize>), ContentValidationError> {
    let file_type = request.file_type_enum().ok_or_else(|| {
        ContentValidationError::UnsupportedFileType {
            file_type: request.file_type.clone(),
        }
    })?;

    let mut files_by_uuid = HashMap::with_capacity(request.files.len());
    let files = request
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            files_by_uuid.entry(file.file_uuid.clone()).or_insert(index);
            ManifestFile::new(file_type, &file.file_path)
        })
        .collect();

    Ok((Manifest::new(files), files_by_uuid))
}

fn assign_report_paths(
    manifest: &mut Manifest,
    workspace: &Workspace,
) -> Result<(), ContentValidationError> {
    let validation_dir = workspace.validation_dir();

    for file in &mut manifest.files {
        let file_name = file.path.to_string_lossy().into_owned();
        file.report_file = Some(report_file_path(validation_dir, &file_name, REPORT_SUFFIX)?);
    }

    let submission_report = validation_dir.join(SUBMISSION_REPORT_FILE);
    tracing::debug!(report = %submission_report.display(), "Submission report assigned");

    manifest.report_file = Some(submission_report);
    manifest.process_dir = Some(workspace.process_dir().to_path_buf());
    Ok(())
}

/// State of one completed validator invocation.
///
/// Owns the workspace (so the report files stay readable) and the file UUID
/// map for this run only.
#[derive(Debug)]
pub struct ValidationRun {
    workspace: Workspace,
    manifest: Manifest,
    files_by_uuid: HashMap<String, usize>,
    response: ValidationResponse,
}

impl ValidationRun {
    pub fn response(&self) -> &ValidationResponse {
        &self.response
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn validation_dir(&self) -> &Path {
        self.workspace.validation_dir()
    }

    /// Results for one file: a single Pass on success, the parsed report
    /// findings otherwise.
    pub async fn create_validation_result_by_file_uuid(
        &self,
        file_uuid: &str,
    ) -> Result<Vec<SingleValidationResult>, ContentValidationError> {
        if self.response.is_success() {
            if !self.files_by_uuid.contains_key(file_uuid) {
                return Err(ContentValidationError::SubmissionFileNotFound {
                    file_uuid: file_uuid.to_string(),
                });
            }
            return Ok(vec![SingleValidationResult::pass(file_uuid)]);
        }

        parse_result_files(&self.manifest, &self.files_by_uuid, file_uuid).await
    }

    /// Leave the workspace on disk once the run is dropped, whatever happens
    /// afterwards, and return its root.
    pub fn keep_workspace(&mut self) -> PathBuf {
        self.workspace.keep().to_path_buf()
    }
}
