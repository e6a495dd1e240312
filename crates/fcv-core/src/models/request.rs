//! Submission request model
//!
//! The command line carries every file of a submission in one string:
//! entries are separated by `;`, fields by `,`, and each field is `key=value`.
//! Entry order is significant: results are reported per file in the same order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ParameterError;

const ENTRY_SEPARATOR: &str = ";";
const FIELD_SEPARATOR: &str = ",";

pub const KEY_VALIDATION_RESULT_UUID: &str = "validationResultUUID";
pub const KEY_VALIDATION_RESULT_VERSION: &str = "validationResultVersion";
pub const KEY_FILE_UUID: &str = "fileUUID";
pub const KEY_FILE_PATH: &str = "filePath";

const KNOWN_KEYS: [&str; 4] = [
    KEY_VALIDATION_RESULT_UUID,
    KEY_VALIDATION_RESULT_VERSION,
    KEY_FILE_UUID,
    KEY_FILE_PATH,
];

/// Read-data formats the external validator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Fastq,
    Bam,
    Cram,
    Vcf,
}

impl FileType {
    pub const ALL: [FileType; 4] = [
        FileType::Fastq,
        FileType::Bam,
        FileType::Cram,
        FileType::Vcf,
    ];

    /// Whether `name` is the exact (case-sensitive) name of a supported type.
    pub fn is_supported(name: &str) -> bool {
        name.parse::<FileType>().is_ok()
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileType::Fastq => write!(f, "FASTQ"),
            FileType::Bam => write!(f, "BAM"),
            FileType::Cram => write!(f, "CRAM"),
            FileType::Vcf => write!(f, "VCF"),
        }
    }
}

impl FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FASTQ" => Ok(FileType::Fastq),
            "BAM" => Ok(FileType::Bam),
            "CRAM" => Ok(FileType::Cram),
            "VCF" => Ok(FileType::Vcf),
            _ => Err(anyhow::anyhow!("Invalid file type: {}", s)),
        }
    }
}

/// One logical input file submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    #[serde(rename = "validationResultUUID")]
    pub validation_result_uuid: String,
    pub validation_result_version: u32,
    #[serde(rename = "fileUUID")]
    pub file_uuid: String,
    pub file_path: String,
}

impl FileRequest {
    fn parse_entry(entry: &str, index: usize) -> Result<Self, ParameterError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();

        for field in entry.split(FIELD_SEPARATOR).filter(|f| !f.is_empty()) {
            let (key, value) =
                field
                    .split_once('=')
                    .ok_or_else(|| ParameterError::MalformedField {
                        field: field.to_string(),
                        entry: index,
                    })?;

            if !KNOWN_KEYS.contains(&key) {
                return Err(ParameterError::UnknownKey {
                    key: key.to_string(),
                    entry: index,
                });
            }

            if fields.insert(key, value).is_some() {
                return Err(ParameterError::DuplicateKey {
                    key: key.to_string(),
                    entry: index,
                });
            }
        }

        let take = |key: &'static str| {
            fields
                .get(key)
                .map(|v| v.to_string())
                .ok_or(ParameterError::MissingKey { key, entry: index })
        };

        let version_raw = take(KEY_VALIDATION_RESULT_VERSION)?;
        let validation_result_version =
            version_raw
                .parse::<u32>()
                .map_err(|_| ParameterError::InvalidVersion {
                    value: version_raw.clone(),
                    entry: index,
                })?;

        Ok(FileRequest {
            validation_result_uuid: take(KEY_VALIDATION_RESULT_UUID)?,
            validation_result_version,
            file_uuid: take(KEY_FILE_UUID)?,
            file_path: take(KEY_FILE_PATH)?,
        })
    }

    /// Serialize back to the `key=value,...` form of a single entry.
    pub fn to_param_string(&self) -> String {
        format!(
            "{}={},{}={},{}={},{}={}",
            KEY_VALIDATION_RESULT_UUID,
            self.validation_result_uuid,
            KEY_VALIDATION_RESULT_VERSION,
            self.validation_result_version,
            KEY_FILE_UUID,
            self.file_uuid,
            KEY_FILE_PATH,
            self.file_path
        )
    }
}

/// Parse the `;` separated file parameter string, preserving entry order.
///
/// Empty entries and empty fields (a trailing `;` or `,`) are skipped.
pub fn parse_file_requests(raw: &str) -> Result<Vec<FileRequest>, ParameterError> {
    let files = raw
        .split(ENTRY_SEPARATOR)
        .enumerate()
        .filter(|(_, entry)| !entry.trim().is_empty())
        .map(|(index, entry)| FileRequest::parse_entry(entry, index))
        .collect::<Result<Vec<_>, _>>()?;

    if files.is_empty() {
        return Err(ParameterError::NoFiles);
    }

    Ok(files)
}

/// Inverse of [`parse_file_requests`].
pub fn format_file_requests(files: &[FileRequest]) -> String {
    files
        .iter()
        .map(FileRequest::to_param_string)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// The unit of work: every file of one submission plus the declared type.
///
/// `file_type` keeps the declared text as given so that an unsupported value
/// can be reported back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub submission_uuid: String,
    pub file_type: String,
    pub files: Vec<FileRequest>,
}

impl SubmissionRequest {
    pub fn new(
        submission_uuid: impl Into<String>,
        file_type: impl Into<String>,
        files: Vec<FileRequest>,
    ) -> Self {
        Self {
            submission_uuid: submission_uuid.into(),
            file_type: file_type.into(),
            files,
        }
    }

    /// Build a request from the three raw command-line parameters.
    pub fn from_params(
        files_param: &str,
        file_type: &str,
        submission_uuid: &str,
    ) -> Result<Self, ParameterError> {
        let files = parse_file_requests(files_param)?;
        Ok(Self::new(submission_uuid, file_type, files))
    }

    /// The declared type, if it is one of the supported formats.
    pub fn file_type_enum(&self) -> Option<FileType> {
        self.file_type.parse().ok()
    }

    pub fn file_uuids(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.file_uuid.as_str())
    }

    pub fn joined_file_uuids(&self, separator: &str) -> String {
        self.file_uuids().collect::<Vec<_>>().join(separator)
    }

    pub fn file(&self, file_uuid: &str) -> Option<&FileRequest> {
        self.files.iter().find(|f| f.file_uuid == file_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(result_uuid: &str, version: u32, file_uuid: &str, path: &str) -> String {
        format!(
            "validationResultUUID={},validationResultVersion={},fileUUID={},filePath={}",
            result_uuid, version, file_uuid, path
        )
    }

    #[test]
    fn parses_entries_in_order() {
        let raw = format!(
            "{};{}",
            entry("vr-1", 0, "file-1", "reads/a_1.fastq.gz"),
            entry("vr-2", 3, "file-2", "reads/a_2.fastq.gz")
        );
        let files = parse_file_requests(&raw).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_uuid, "file-1");
        assert_eq!(files[0].validation_result_version, 0);
        assert_eq!(files[1].file_uuid, "file-2");
        assert_eq!(files[1].validation_result_uuid, "vr-2");
        assert_eq!(files[1].validation_result_version, 3);
        assert_eq!(files[1].file_path, "reads/a_2.fastq.gz");
    }

    #[test]
    fn format_then_parse_preserves_order_and_fields() {
        let files: Vec<FileRequest> = (0..4)
            .map(|i| FileRequest {
                validation_result_uuid: uuid::Uuid::new_v4().to_string(),
                validation_result_version: i,
                file_uuid: uuid::Uuid::new_v4().to_string(),
                file_path: format!("data/run_{}.bam", i),
            })
            .collect();

        let raw = format_file_requests(&files);
        assert_eq!(parse_file_requests(&raw).unwrap(), files);
    }

    #[test]
    fn empty_value_is_tolerated() {
        let raw = "validationResultUUID=vr,validationResultVersion=1,fileUUID=f,filePath=";
        let files = parse_file_requests(raw).unwrap();
        assert_eq!(files[0].file_path, "");
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let raw = "validationResultUUID=vr,validationResultVersion=1,fileUUID=f,filePath=a=b.bam";
        let files = parse_file_requests(raw).unwrap();
        assert_eq!(files[0].file_path, "a=b.bam");
    }

    #[test]
    fn trailing_separators_are_skipped() {
        let raw = format!("{},;", entry("vr", 0, "f", "x.bam"));
        assert_eq!(parse_file_requests(&raw).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let raw = format!("{},fileUUID=other", entry("vr", 0, "f", "x.bam"));
        assert_eq!(
            parse_file_requests(&raw),
            Err(ParameterError::DuplicateKey {
                key: "fileUUID".to_string(),
                entry: 0
            })
        );
    }

    #[test]
    fn field_without_separator_is_rejected() {
        let raw = format!(
            "{};{},oops",
            entry("vr", 0, "f", "x.bam"),
            entry("vr2", 0, "g", "y.bam")
        );
        assert_eq!(
            parse_file_requests(&raw),
            Err(ParameterError::MalformedField {
                field: "oops".to_string(),
                entry: 1
            })
        );
    }

    #[test]
    fn error_index_counts_skipped_entries() {
        let raw = format!(";{};x", entry("vr", 0, "f", "x.bam"));
        assert_eq!(
            parse_file_requests(&raw),
            Err(ParameterError::MalformedField {
                field: "x".to_string(),
                entry: 2
            })
        );
    }

    #[test]
    fn unknown_and_missing_keys_are_rejected() {
        let raw = format!("{},colour=blue", entry("vr", 0, "f", "x.bam"));
        assert!(matches!(
            parse_file_requests(&raw),
            Err(ParameterError::UnknownKey { .. })
        ));

        let raw = "validationResultUUID=vr,validationResultVersion=0,fileUUID=f";
        assert_eq!(
            parse_file_requests(raw),
            Err(ParameterError::MissingKey {
                key: KEY_FILE_PATH,
                entry: 0
            })
        );
    }

    #[test]
    fn non_numeric_version_is_rejected() {
        let raw = "validationResultUUID=vr,validationResultVersion=-1,fileUUID=f,filePath=x";
        assert!(matches!(
            parse_file_requests(raw),
            Err(ParameterError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn empty_parameter_string_is_rejected() {
        assert_eq!(parse_file_requests(""), Err(ParameterError::NoFiles));
        assert_eq!(parse_file_requests(" ; "), Err(ParameterError::NoFiles));
    }

    #[test]
    fn file_type_names_are_case_sensitive() {
        for file_type in FileType::ALL {
            assert!(FileType::is_supported(&file_type.to_string()));
        }
        assert!(!FileType::is_supported("fastq"));
        assert!(!FileType::is_supported("qseq"));
    }

    #[test]
    fn submission_request_helpers() {
        let raw = format!(
            "{};{}",
            entry("vr-1", 0, "file-1", "a.bam"),
            entry("vr-2", 0, "file-2", "b.bam")
        );
        let request = SubmissionRequest::from_params(&raw, "BAM", "sub-1").unwrap();

        assert_eq!(request.file_type_enum(), Some(FileType::Bam));
        assert_eq!(request.joined_file_uuids(", "), "file-1, file-2");
        assert_eq!(request.file("file-2").unwrap().file_path, "b.bam");
        assert!(request.file("file-3").is_none());
    }
}
