//! file-content-validator: validates the content of one submission's files
//! and publishes one result message per file.
//!
//! Deployment settings come from the environment (see `ValidatorConfig`); the
//! external validator program is set with FCV_VALIDATOR_COMMAND.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use fcv_cli::{init_tracing, report_failure, Args};
use fcv_core::{AppError, ValidatorConfig};
use fcv_processing::CommandValidator;
use fcv_services::{FileContentValidationHandler, HandlerOutcome, StdoutPublisher};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match ValidatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            return ExitCode::from(report_failure(&AppError::from(e)));
        }
    };
    init_tracing(config.is_production());

    match run(&args, &config).await {
        Ok(outcome) => {
            tracing::info!(
                submission_uuid = %args.submission_uuid,
                status = ?outcome.status,
                parameter_failures = outcome.parameter_failures,
                messages = outcome.dispatched.len(),
                has_errors = outcome.has_errors(),
                "File content validation finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => ExitCode::from(report_failure(&e)),
    }
}

async fn run(args: &Args, config: &ValidatorConfig) -> Result<HandlerOutcome, AppError> {
    let request = args.to_request()?;
    let validator = CommandValidator::from_config(config)?;

    tracing::info!(
        environment = %config.environment,
        output_root = %config.output_root.display(),
        exchange = %config.submission_exchange,
        "File content validator started"
    );

    let handler = FileContentValidationHandler::from_config(
        config,
        Arc::new(validator),
        Arc::new(StdoutPublisher),
    );
    handler.handle(&request).await
}
