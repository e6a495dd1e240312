//! End-to-end handling of one submission: check parameters, run the validator,
//! publish one envelope per file.

use std::path::PathBuf;
use std::sync::Arc;

use fcv_core::{
    AppError, FileRequest, ParameterFailure, SingleValidationResult, SubmissionRequest,
    ValidatorConfig,
};
use fcv_processing::{
    validate_parameters, ContentValidator, ValidationOrchestrator, ValidationStatus,
    WorkspaceLayout,
};

use crate::dispatcher::ResultDispatcher;
use crate::envelope::{build_envelope, failures_for_file};
use crate::publisher::MessagePublisher;

/// One envelope that left the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEnvelope {
    pub file_uuid: String,
    pub validation_result_uuid: String,
    pub routing_key: &'static str,
}

#[derive(Debug, Default)]
pub struct HandlerOutcome {
    /// Number of parameter failures found before validation.
    pub parameter_failures: usize,
    /// Validator status; `None` when parameter checks stopped the run.
    pub status: Option<ValidationStatus>,
    pub dispatched: Vec<DispatchedEnvelope>,
    /// Root of the kept workspace.
    pub workspace: Option<PathBuf>,
}

impl HandlerOutcome {
    pub fn has_errors(&self) -> bool {
        self.parameter_failures > 0 || self.status == Some(ValidationStatus::Error)
    }
}

pub struct FileContentValidationHandler {
    orchestrator: ValidationOrchestrator,
    dispatcher: ResultDispatcher,
    keep_workspace: bool,
}

impl FileContentValidationHandler {
    pub fn new(orchestrator: ValidationOrchestrator, dispatcher: ResultDispatcher) -> Self {
        Self {
            orchestrator,
            dispatcher,
            keep_workspace: false,
        }
    }

    pub fn from_config(
        config: &ValidatorConfig,
        validator: Arc<dyn ContentValidator>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        let orchestrator = ValidationOrchestrator::new(validator, WorkspaceLayout::from(config));
        let dispatcher = ResultDispatcher::new(publisher, config.submission_exchange.clone());
        Self::new(orchestrator, dispatcher).with_keep_workspace(config.keep_workspace)
    }

    pub fn with_keep_workspace(mut self, keep_workspace: bool) -> Self {
        self.keep_workspace = keep_workspace;
        self
    }

    pub async fn handle(&self, request: &SubmissionRequest) -> Result<HandlerOutcome, AppError> {
        tracing::info!(
            submission_uuid = %request.submission_uuid,
            file_type = %request.file_type,
            files = request.files.len(),
            "File content validation started"
        );

        let failures = validate_parameters(request);
        if !failures.is_empty() {
            return self.reject(request, failures).await;
        }

        let mut run = self
            .orchestrator
            .handle_file_content_validation(request)
            .await?;

        // Kept before reading reports so a failure below leaves them on disk.
        let workspace = if self.keep_workspace {
            let root = run.keep_workspace();
            tracing::info!(path = %root.display(), "Workspace kept");
            Some(root)
        } else {
            None
        };

        let mut dispatched = Vec::with_capacity(request.files.len());
        for file in &request.files {
            let results = run
                .create_validation_result_by_file_uuid(&file.file_uuid)
                .await?;
            dispatched.push(self.send(file, results).await?);
        }

        Ok(HandlerOutcome {
            parameter_failures: 0,
            status: Some(run.response().status),
            dispatched,
            workspace,
        })
    }

    /// Report parameter failures without staging a workspace. Every file gets
    /// an envelope; one with no failure of its own is marked as not validated.
    async fn reject(
        &self,
        request: &SubmissionRequest,
        failures: Vec<SingleValidationResult>,
    ) -> Result<HandlerOutcome, AppError> {
        tracing::warn!(
            submission_uuid = %request.submission_uuid,
            failures = failures.len(),
            "Submission failed parameter validation"
        );

        let mut dispatched = Vec::with_capacity(request.files.len());
        for file in &request.files {
            let mut own = failures_for_file(&failures, file);
            if own.is_empty() {
                own.push(SingleValidationResult::error(
                    ParameterFailure::SubmissionRejected.to_string(),
                    file.file_uuid.clone(),
                ));
            }
            dispatched.push(self.send(file, own).await?);
        }

        Ok(HandlerOutcome {
            parameter_failures: failures.len(),
            dispatched,
            ..Default::default()
        })
    }

    async fn send(
        &self,
        file: &FileRequest,
        results: Vec<SingleValidationResult>,
    ) -> Result<DispatchedEnvelope, AppError> {
        let envelope = build_envelope(file, results);
        let routing_key = self.dispatcher.dispatch(&envelope).await?;

        Ok(DispatchedEnvelope {
            file_uuid: file.file_uuid.clone(),
            validation_result_uuid: envelope.validation_result_uuid,
            routing_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{ROUTING_KEY_ERROR, ROUTING_KEY_SUCCESS};
    use crate::publisher::RecordingPublisher;
    use async_trait::async_trait;
    use fcv_processing::{Manifest, ValidationResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct CountingValidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentValidator for CountingValidator {
        async fn validate(&self, _manifest: &Manifest) -> anyhow::Result<ValidationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ValidationResponse::success())
        }
    }

    fn file(uuid: &str, path: &str) -> FileRequest {
        FileRequest {
            validation_result_uuid: format!("vr-{}", uuid),
            validation_result_version: 1,
            file_uuid: uuid.to_string(),
            file_path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn parameter_failures_skip_validation() {
        let output = tempdir().unwrap();
        let validator = Arc::new(CountingValidator::default());
        let publisher = Arc::new(RecordingPublisher::new());
        let handler = FileContentValidationHandler::new(
            ValidationOrchestrator::new(validator.clone(), WorkspaceLayout::new(output.path(), "reads")),
            ResultDispatcher::new(publisher.clone(), "ex"),
        );

        let request = SubmissionRequest::new(
            "sub-1",
            "BAM",
            vec![file("file-1", "/nonexistent/a.bam")],
        );
        let outcome = handler.handle(&request).await.unwrap();

        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.parameter_failures, 1);
        assert_eq!(outcome.status, None);
        assert!(outcome.has_errors());
        assert_eq!(outcome.dispatched[0].routing_key, ROUTING_KEY_ERROR);
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);

        let messages = publisher.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].payload.single_validation_results[0].message,
            "File not found with target path: /nonexistent/a.bam"
        );
    }

    #[tokio::test]
    async fn successful_run_removes_workspace_by_default() {
        let inputs = tempdir().unwrap();
        let output = tempdir().unwrap();
        let path = inputs.path().join("calls.vcf");
        std::fs::write(&path, b"##fileformat=VCFv4.2\n").unwrap();

        let publisher = Arc::new(RecordingPublisher::new());
        let handler = FileContentValidationHandler::new(
            ValidationOrchestrator::new(
                Arc::new(CountingValidator::default()),
                WorkspaceLayout::new(output.path(), "variants"),
            ),
            ResultDispatcher::new(publisher.clone(), "ex"),
        );
        let request = SubmissionRequest::new(
            "sub-2",
            "VCF",
            vec![file("file-v", path.to_str().unwrap())],
        );

        let outcome = handler.handle(&request).await.unwrap();
        assert_eq!(outcome.status, Some(ValidationStatus::Success));
        assert!(!outcome.has_errors());
        assert_eq!(outcome.dispatched[0].routing_key, ROUTING_KEY_SUCCESS);
        assert!(outcome.workspace.is_none());
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn kept_workspace_survives_the_run() {
        let inputs = tempdir().unwrap();
        let output = tempdir().unwrap();
        let path = inputs.path().join("a.cram");
        std::fs::write(&path, b"CRAM").unwrap();

        let handler = FileContentValidationHandler::new(
            ValidationOrchestrator::new(
                Arc::new(CountingValidator::default()),
                WorkspaceLayout::new(output.path(), "reads"),
            ),
            ResultDispatcher::new(Arc::new(RecordingPublisher::new()), "ex"),
        )
        .with_keep_workspace(true);
        let request = SubmissionRequest::new(
            "sub-3",
            "CRAM",
            vec![file("file-c", path.to_str().unwrap())],
        );

        let outcome = handler.handle(&request).await.unwrap();
        let root = outcome.workspace.unwrap();
        assert!(root.join("reads").join("validate").is_dir());
        assert!(root.starts_with(output.path()));
    }

    #[tokio::test]
    async fn every_file_hears_back_when_a_sibling_is_missing() {
        let inputs = tempdir().unwrap();
        let output = tempdir().unwrap();
        let present = inputs.path().join("a.bam");
        std::fs::write(&present, b"BAM\x01").unwrap();

        let publisher = Arc::new(RecordingPublisher::new());
        let handler = FileContentValidationHandler::new(
            ValidationOrchestrator::new(
                Arc::new(CountingValidator::default()),
                WorkspaceLayout::new(output.path(), "reads"),
            ),
            ResultDispatcher::new(publisher.clone(), "ex"),
        );
        let request = SubmissionRequest::new(
            "sub-4",
            "BAM",
            vec![
                file("file-a", present.to_str().unwrap()),
                file("file-b", "/nonexistent/b.bam"),
            ],
        );

        let outcome = handler.handle(&request).await.unwrap();
        assert_eq!(outcome.parameter_failures, 1);

        let messages = publisher.messages();
        let uuids: Vec<_> = messages
            .iter()
            .map(|m| m.payload.validation_result_uuid.as_str())
            .collect();
        assert_eq!(uuids, vec!["vr-file-a", "vr-file-b"]);
        assert!(messages.iter().all(|m| m.routing_key == ROUTING_KEY_ERROR));

        let sibling = &messages[0].payload.single_validation_results;
        assert_eq!(sibling.len(), 1);
        assert_eq!(sibling[0].entity_uuid, "file-a");
        assert_eq!(
            sibling[0].message,
            "File was not validated because the submission failed parameter validation"
        );
        assert_eq!(
            messages[1].payload.single_validation_results[0].message,
            "File not found with target path: /nonexistent/b.bam"
        );
    }

    #[tokio::test]
    async fn kept_workspace_survives_a_report_failure() {
        struct ErrorWithoutReports;

        #[async_trait]
        impl ContentValidator for ErrorWithoutReports {
            async fn validate(&self, _manifest: &Manifest) -> anyhow::Result<ValidationResponse> {
                Ok(ValidationResponse::error())
            }
        }

        let inputs = tempdir().unwrap();
        let output = tempdir().unwrap();
        let path = inputs.path().join("a.bam");
        std::fs::write(&path, b"BAM\x01").unwrap();

        let handler = FileContentValidationHandler::new(
            ValidationOrchestrator::new(
                Arc::new(ErrorWithoutReports),
                WorkspaceLayout::new(output.path(), "reads"),
            ),
            ResultDispatcher::new(Arc::new(RecordingPublisher::new()), "ex"),
        )
        .with_keep_workspace(true);
        let request = SubmissionRequest::new(
            "sub-5",
            "BAM",
            vec![file("file-a", path.to_str().unwrap())],
        );

        let err = handler.handle(&request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let roots: Vec<_> = std::fs::read_dir(output.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].join("reads").join("validate").is_dir());
    }
}
