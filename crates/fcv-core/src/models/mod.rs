pub mod request;
pub mod result;

pub use request::{
    format_file_requests, parse_file_requests, FileRequest, FileType, SubmissionRequest,
};
pub use result::{
    ResultEnvelope, SingleValidationResult, SingleValidationResultStatus, ValidationAuthor,
};
