use clap::Parser;

use fcv_core::{AppError, ErrorMetadata, LogLevel, SubmissionRequest};

/// Exit status when the command-line parameters cannot be parsed.
pub const EXIT_INVALID_PARAMETERS: u8 = 2;
/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Validate the content of the files of one submission and report the
/// results to the submission aggregator.
#[derive(Parser, Debug)]
#[command(name = "file-content-validator", version)]
pub struct Args {
    /// Files to validate: `validationResultUUID=..,validationResultVersion=..,fileUUID=..,filePath=..`
    /// entries separated by `;`
    #[arg(long = "fileContentValidator.files")]
    pub files: String,

    /// Declared type of every file: FASTQ, BAM, CRAM or VCF
    #[arg(long = "fileContentValidator.fileType")]
    pub file_type: String,

    #[arg(long = "fileContentValidator.submissionUUID")]
    pub submission_uuid: String,
}

impl Args {
    pub fn to_request(&self) -> Result<SubmissionRequest, AppError> {
        Ok(SubmissionRequest::from_params(
            &self.files,
            &self.file_type,
            &self.submission_uuid,
        )?)
    }
}

/// Initialize tracing for the binary. Logs go to stderr; stdout is reserved
/// for published messages.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Log `err` at the level its kind asks for and return the process exit code.
pub fn report_failure(err: &AppError) -> u8 {
    let code = err.error_code();
    let detail = err.detailed_message();
    match err.log_level() {
        LogLevel::Warn => tracing::warn!(error_code = code, error = %detail, "Validation aborted"),
        LogLevel::Error => tracing::error!(
            error_code = code,
            error_type = err.error_type(),
            recoverable = err.is_recoverable(),
            error = %detail,
            "Validation failed"
        ),
    }

    match err {
        AppError::Parameters(_) => EXIT_INVALID_PARAMETERS,
        _ => EXIT_FAILURE,
    }
}
