//! Configuration module
//!
//! Deployment settings are read from the environment (optionally seeded from a
//! `.env` file). Per-submission values come from the command line instead.

use std::env;
use std::path::PathBuf;

const DEFAULT_CONTEXT_TYPE: &str = "reads";
const DEFAULT_SUBMISSION_EXCHANGE: &str = "usi-1:submission-exchange";

#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Parent directory of the per-invocation workspace roots.
    pub output_root: PathBuf,
    /// Directory level between a workspace root and its validate/process dirs.
    pub context_type: String,
    /// Keep workspaces on disk after the run instead of removing them.
    pub keep_workspace: bool,
    /// External validator program. Required by the binary, not by the library.
    pub validator_command: Option<String>,
    pub validator_args: Vec<String>,
    pub submission_exchange: String,
    pub environment: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            output_root: env::temp_dir(),
            context_type: DEFAULT_CONTEXT_TYPE.to_string(),
            keep_workspace: false,
            validator_command: None,
            validator_args: Vec::new(),
            submission_exchange: DEFAULT_SUBMISSION_EXCHANGE.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = ValidatorConfig {
            output_root: env::var("FCV_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            context_type: env::var("FCV_CONTEXT_TYPE")
                .unwrap_or_else(|_| DEFAULT_CONTEXT_TYPE.to_string()),
            keep_workspace: env::var("FCV_KEEP_WORKSPACE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            validator_command: env::var("FCV_VALIDATOR_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            validator_args: env::var("FCV_VALIDATOR_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            submission_exchange: env::var("FCV_SUBMISSION_EXCHANGE")
                .unwrap_or_else(|_| DEFAULT_SUBMISSION_EXCHANGE.to_string()),
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.context_type.trim().is_empty() {
            return Err(anyhow::anyhow!("FCV_CONTEXT_TYPE cannot be empty"));
        }
        if self.submission_exchange.trim().is_empty() {
            return Err(anyhow::anyhow!("FCV_SUBMISSION_EXCHANGE cannot be empty"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// The validator program, or an error naming the variable to set.
    pub fn require_validator_command(&self) -> Result<&str, anyhow::Error> {
        self.validator_command
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("FCV_VALIDATOR_COMMAND must be set"))
    }
}
