use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SubmissionsError {
    #[error("search term must not be empty")]
    #[diagnostic(help("search on a Biosample ID, a Specimen ID or a Biospecimen ID"))]
    EmptySearchTerm,

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("submissions API request failed: {0}")]
    Http(String),

    #[error("failed to decode submissions API response: {0}")]
    Decode(String),

    #[error("nothing found and {0} lookup(s) failed")]
    #[diagnostic(help("check that the submissions API is reachable (--base-url, SUBMISSIONS_API_URL)"))]
    LookupsFailed(usize),

    #[error("failed to write output: {0}")]
    Output(String),
}

impl SubmissionsError {
    /// Process exit code: 2 for input and config problems, 3 when the API
    /// could not be talked to, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            SubmissionsError::EmptySearchTerm
            | SubmissionsError::InvalidBaseUrl(_)
            | SubmissionsError::ConfigRead(_)
            | SubmissionsError::ConfigParse(_) => 2,
            SubmissionsError::Http(_)
            | SubmissionsError::Decode(_)
            | SubmissionsError::LookupsFailed(_) => 3,
            SubmissionsError::Output(_) => 1,
        }
    }
}
