use std::time::{Duration, Instant};

use serde::Serialize;

use crate::client::SubmissionsClient;
use crate::domain::SearchTerm;
use crate::environment::Environment;
use crate::error::SubmissionsError;
use crate::resolver::{Resolution, Resolver};

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub term: SearchTerm,
    pub searched_at: String,
    #[serde(flatten)]
    pub resolution: Resolution,
}

impl SearchReport {
    pub fn found(&self) -> bool {
        !self.resolution.is_empty()
    }

    /// Fails when nothing was found and at least one lookup failed, so a
    /// down API is not reported as "no match".
    pub fn ensure_reachable(&self) -> Result<(), SubmissionsError> {
        let failed = self.resolution.failures.len();
        if !self.found() && failed > 0 {
            return Err(SubmissionsError::LookupsFailed(failed));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    pub environment: String,
    pub brand: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: SubmissionsClient> {
    resolver: Resolver<C>,
}

impl<C: SubmissionsClient> App<C> {
    pub fn new(client: C) -> Self {
        Self {
            resolver: Resolver::new(client),
        }
    }

    pub fn resolver(&self) -> &Resolver<C> {
        &self.resolver
    }

    /// Parses `input` and resolves it against all three lookups.
    ///
    /// Only a blank term is an error; lookup failures are carried in the
    /// report.
    pub fn search(
        &self,
        input: &str,
        sink: &dyn ProgressSink,
    ) -> Result<SearchReport, SubmissionsError> {
        let term: SearchTerm = input.parse()?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; searching {term}"),
            elapsed: None,
        });
        let start = Instant::now();
        let resolution = self.resolver.resolve(&term);
        sink.event(ProgressEvent {
            message: format!(
                "phase=Done; matched={} failed={}",
                resolution.matched.len(),
                resolution.failures.len()
            ),
            elapsed: Some(start.elapsed()),
        });
        Ok(SearchReport {
            term,
            searched_at: iso_timestamp(),
            resolution,
        })
    }

    pub fn environment(&self, sink: &dyn ProgressSink) -> Environment {
        sink.event(ProgressEvent {
            message: "phase=Resolve; asking for deployment environment".to_string(),
            elapsed: None,
        });
        Environment::detect(self.resolver.client())
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
