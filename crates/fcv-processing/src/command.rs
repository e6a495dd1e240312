//! [`ContentValidator`] backed by an external program.
//!
//! The manifest is written as JSON into the process directory and the program
//! is run as `<program> [args...] --manifest <path>`. It must print a JSON
//! [`ValidationResponse`] on stdout and exit with status 0.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use crate::manifest::{ContentValidator, Manifest, ValidationResponse};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_FLAG: &str = "--manifest";

#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &fcv_core::ValidatorConfig) -> Result<Self> {
        let program = config.require_validator_command()?;
        Ok(Self::new(program, config.validator_args.clone()))
    }

    async fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf> {
        let process_dir = manifest
            .process_dir
            .as_ref()
            .ok_or_else(|| anyhow!("Manifest has no process directory"))?;
        let path = process_dir.join(MANIFEST_FILE);

        let body = serde_json::to_vec_pretty(manifest).context("Failed to serialize manifest")?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write manifest to {}", path.display()))?;

        Ok(path)
    }
}

#[async_trait]
impl ContentValidator for CommandValidator {
    #[tracing::instrument(skip(self, manifest), fields(
        process.executable.name = %self.program,
        files = manifest.files.len()
    ))]
    async fn validate(&self, manifest: &Manifest) -> Result<ValidationResponse> {
        let manifest_path = self.write_manifest(manifest).await?;
        let start = std::time::Instant::now();

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(MANIFEST_FLAG)
            .arg(&manifest_path)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program))?;

        if !output.status.success() {
            return Err(anyhow!(
                "{} failed ({}): {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let response: ValidationResponse = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Failed to parse {} output", self.program))?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            status = ?response.status,
            "Validator finished"
        );

        Ok(response)
    }
}
