use std::fmt;

use serde::Serialize;

use crate::client::SubmissionsClient;

pub const PRODUCTION: &str = "production";
pub const BRAND: &str = "Submissions";

/// Deployment environment reported by the API, used to brand the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub name: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(PRODUCTION)
    }
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Self {
                name: PRODUCTION.to_string(),
            };
        }
        Self {
            name: name.to_string(),
        }
    }

    /// Asks the API which environment it serves. Falls back to production
    /// when the endpoint is unreachable or answers without a name.
    pub fn detect<C: SubmissionsClient>(client: &C) -> Self {
        match client.fetch_environment() {
            Ok(Some(name)) => Self::new(name),
            Ok(None) => {
                tracing::debug!("environment endpoint gave no name; assuming production");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "environment lookup failed; assuming production");
                Self::default()
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.name.eq_ignore_ascii_case(PRODUCTION)
    }

    /// "Submissions" in production, "Submissions-<env>" elsewhere.
    pub fn brand(&self) -> String {
        if self.is_production() {
            BRAND.to_string()
        } else {
            format!("{BRAND}-{}", self.name)
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_per_environment() {
        assert_eq!(Environment::default().brand(), "Submissions");
        assert_eq!(Environment::new("staging").brand(), "Submissions-staging");
        assert_eq!(Environment::new("  ").name, PRODUCTION);
    }
}
