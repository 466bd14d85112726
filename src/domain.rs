use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SubmissionsError;

/// Free-text identifier typed into the search box.
///
/// The only validation is non-emptiness: the same term is tried as a
/// biosample accession, a specimen ID and a biospecimen ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SearchTerm {
    type Err = SubmissionsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SubmissionsError::EmptySearchTerm);
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    SampleByAccession,
    SpecimenBySpecimenId,
    SpecimenByBiospecimenId,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [
        LookupKind::SampleByAccession,
        LookupKind::SpecimenBySpecimenId,
        LookupKind::SpecimenByBiospecimenId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LookupKind::SampleByAccession => "sample by biosample accession",
            LookupKind::SpecimenBySpecimenId => "specimen by specimen ID",
            LookupKind::SpecimenByBiospecimenId => "specimen by biospecimen ID",
        }
    }

    /// URL path segments below the API base for `term`.
    pub fn path_segments(self, term: &SearchTerm) -> Vec<&str> {
        match self {
            LookupKind::SampleByAccession => vec!["api", "v1", "samples", term.as_str()],
            LookupKind::SpecimenBySpecimenId => vec![
                "api",
                "v1",
                "specimens",
                "specimenId",
                term.as_str(),
                "samples",
            ],
            LookupKind::SpecimenByBiospecimenId => vec![
                "api",
                "v1",
                "specimens",
                "biospecimenId",
                term.as_str(),
                "samples",
            ],
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
