//! Per-invocation working directories.
//!
//! Every validation run gets its own root under the configured output root:
//!
//! ```text
//! {output_root}/{submission}_{file uuids}_{random}/{context_type}/validate
//! {output_root}/{submission}_{file uuids}_{random}/{context_type}/process
//! ```
//!
//! The external validator writes into these directories as a side effect, so
//! two runs must never share a root, even for the same submission. Identifiers
//! used as path segments are sanitized first.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::TempDir;

use fcv_core::{ContentValidationError, FileHandleError};

pub const VALIDATE_DIR: &str = "validate";
pub const PROCESS_DIR: &str = "process";

/// Keeps the root directory name well below common file name limits when a
/// submission has many files.
const MAX_ROOT_PREFIX_LEN: usize = 128;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-_.]").expect("valid unsafe-char pattern"));
static DOT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("valid dot-run pattern"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid underscore-run pattern"));

/// Make an externally supplied identifier safe to use as one path segment.
///
/// Disallowed characters and `..` runs become `_`, runs of `_` collapse, and a
/// single leading/trailing `_` is dropped unless the segment is only `_`.
pub fn sanitize_segment(segment: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(segment, "_");
    let replaced = DOT_RUNS.replace_all(&replaced, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");

    if collapsed.chars().all(|c| c == '_') {
        return collapsed.into_owned();
    }

    let trimmed = collapsed.strip_prefix('_').unwrap_or(&collapsed);
    let trimmed = trimmed.strip_suffix('_').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Resolve `base/segment/...` with every segment sanitized, without touching disk.
pub fn resolve_output_dir(base: &Path, segments: &[&str]) -> Result<PathBuf, FileHandleError> {
    if base.as_os_str().is_empty() {
        return Err(FileHandleError::MissingOutputDir);
    }

    let mut path = base.to_path_buf();
    for segment in segments {
        let safe = sanitize_segment(segment);
        if safe.is_empty() || safe == "." {
            return Err(FileHandleError::InvalidPathSegment {
                segment: segment.to_string(),
            });
        }
        path.push(safe);
    }

    Ok(path)
}

/// Resolve and create (with parents) `base/segment/...`. Existing directories are reused.
pub fn create_output_dir(base: &Path, segments: &[&str]) -> Result<PathBuf, FileHandleError> {
    let dir = resolve_output_dir(base, segments)?;

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|source| FileHandleError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    Ok(dir)
}

/// Like [`create_output_dir`], but any existing content is removed first.
pub fn create_fresh_dir(base: &Path, segments: &[&str]) -> Result<PathBuf, FileHandleError> {
    let dir = resolve_output_dir(base, segments)?;

    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|source| FileHandleError::EmptyDirectory {
            path: dir.clone(),
            source,
        })?;
    }

    create_output_dir(base, segments)
}

/// Path of a report file named after `file_name` inside an existing directory.
pub fn report_file_path(
    dir: &Path,
    file_name: &str,
    suffix: &str,
) -> Result<PathBuf, FileHandleError> {
    if !dir.is_dir() {
        return Err(FileHandleError::InvalidReportDir {
            path: dir.to_path_buf(),
        });
    }

    let base_name = Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| sanitize_segment(file_name));

    Ok(dir.join(format!("{}{}", base_name, suffix)))
}

/// Where workspaces go and how they are laid out.
#[derive(Clone, Debug)]
pub struct WorkspaceLayout {
    pub output_root: PathBuf,
    pub context_type: String,
}

impl WorkspaceLayout {
    pub fn new(output_root: impl Into<PathBuf>, context_type: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            context_type: context_type.into(),
        }
    }
}

impl From<&fcv_core::ValidatorConfig> for WorkspaceLayout {
    fn from(config: &fcv_core::ValidatorConfig) -> Self {
        Self::new(config.output_root.clone(), config.context_type.clone())
    }
}

/// The directories owned by one validation run.
///
/// The root is removed when the workspace is dropped; call [`Workspace::keep`]
/// or [`Workspace::persist`] to leave it on disk.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    /// `None` once the workspace has been kept.
    guard: Option<TempDir>,
    validation_dir: PathBuf,
    process_dir: PathBuf,
}

impl Workspace {
    /// Allocate a fresh root for `submission_uuid` and create its validate and
    /// process directories.
    pub fn create(
        layout: &WorkspaceLayout,
        submission_uuid: &str,
        file_uuids: &[&str],
    ) -> Result<Self, ContentValidationError> {
        if submission_uuid.trim().is_empty() {
            return Err(ContentValidationError::ExecutorInit(
                "Missing submission's UUID.".to_string(),
            ));
        }

        let root = create_temp_root(&layout.output_root, submission_uuid, file_uuids)?;

        let validation_dir =
            create_fresh_dir(root.path(), &[layout.context_type.as_str(), VALIDATE_DIR])?;
        let process_dir =
            create_fresh_dir(root.path(), &[layout.context_type.as_str(), PROCESS_DIR])?;

        tracing::debug!(
            submission_uuid = %submission_uuid,
            root = %root.path().display(),
            "Workspace staged"
        );

        Ok(Self {
            root: root.path().to_path_buf(),
            guard: Some(root),
            validation_dir,
            process_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validation_dir(&self) -> &Path {
        &self.validation_dir
    }

    pub fn process_dir(&self) -> &Path {
        &self.process_dir
    }

    /// Leave the root on disk when this workspace is dropped.
    pub fn keep(&mut self) -> &Path {
        if let Some(guard) = self.guard.take() {
            let _ = guard.keep();
        }
        &self.root
    }

    pub fn is_kept(&self) -> bool {
        self.guard.is_none()
    }

    /// Keep the workspace on disk and return its root.
    pub fn persist(mut self) -> PathBuf {
        self.keep();
        self.root
    }
}

fn create_temp_root(
    output_root: &Path,
    submission_uuid: &str,
    file_uuids: &[&str],
) -> Result<TempDir, FileHandleError> {
    if output_root.as_os_str().is_empty() {
        return Err(FileHandleError::MissingOutputDir);
    }

    fs::create_dir_all(output_root).map_err(|source| FileHandleError::CreateDir {
        path: output_root.to_path_buf(),
        source,
    })?;

    let mut prefix = sanitize_segment(&format!("{}_{}", submission_uuid, file_uuids.join("_")));
    prefix.truncate(MAX_ROOT_PREFIX_LEN);
    prefix.push('_');

    tempfile::Builder::new()
        .prefix(&prefix)
        .tempdir_in(output_root)
        .map_err(|source| FileHandleError::CreateDir {
            path: output_root.join(&prefix),
            source,
        })
}
