use std::thread;
use std::time::Instant;

use serde::Serialize;

use crate::client::SubmissionsClient;
use crate::domain::{LookupKind, SearchTerm};
use crate::error::SubmissionsError;
use crate::model::{Sample, Specimen};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFailure {
    pub lookup: LookupKind,
    pub message: String,
}

/// Outcome of one search term against all three lookups.
///
/// Built only after every lookup has settled, so it never depends on the
/// order in which responses arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub sample: Option<Sample>,
    pub specimen: Option<Specimen>,
    /// Which specimen lookup supplied `specimen`.
    pub specimen_source: Option<LookupKind>,
    /// Lookups that returned an entity, in [`LookupKind::ALL`] order.
    pub matched: Vec<LookupKind>,
    pub failures: Vec<LookupFailure>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.sample.is_none() && self.specimen.is_none()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Resolver<C: SubmissionsClient> {
    client: C,
}

impl<C: SubmissionsClient> Resolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs the three lookups concurrently and joins them.
    ///
    /// When both specimen lookups succeed the specimen-ID result wins over
    /// the biospecimen-ID result. Transport and decode failures count as
    /// "not found" for the result slots and are reported in
    /// [`Resolution::failures`].
    pub fn resolve(&self, term: &SearchTerm) -> Resolution {
        let started = Instant::now();
        let (sample, by_specimen_id, by_biospecimen_id) = thread::scope(|scope| {
            let sample = scope.spawn(|| self.client.fetch_sample(term));
            let by_specimen_id = scope.spawn(|| self.client.fetch_specimen_by_specimen_id(term));
            let by_biospecimen_id = self.client.fetch_specimen_by_biospecimen_id(term);
            (
                sample.join().unwrap_or_else(|_| Err(panicked())),
                by_specimen_id.join().unwrap_or_else(|_| Err(panicked())),
                by_biospecimen_id,
            )
        });

        let mut resolution = Resolution::default();
        let sample = settle(LookupKind::SampleByAccession, sample, &mut resolution);
        let by_specimen_id = settle(
            LookupKind::SpecimenBySpecimenId,
            by_specimen_id,
            &mut resolution,
        );
        let by_biospecimen_id = settle(
            LookupKind::SpecimenByBiospecimenId,
            by_biospecimen_id,
            &mut resolution,
        );

        let (specimen, specimen_source) = match (by_specimen_id, by_biospecimen_id) {
            (Some(primary), Some(secondary)) => {
                if primary != secondary {
                    tracing::warn!(
                        %term,
                        kept = ?primary.specimen_id,
                        discarded = ?secondary.specimen_id,
                        "specimen and biospecimen lookups disagree; keeping the specimen ID match"
                    );
                }
                (Some(primary), Some(LookupKind::SpecimenBySpecimenId))
            }
            (Some(primary), None) => (Some(primary), Some(LookupKind::SpecimenBySpecimenId)),
            (None, Some(secondary)) => (Some(secondary), Some(LookupKind::SpecimenByBiospecimenId)),
            (None, None) => (None, None),
        };
        resolution.sample = sample;
        resolution.specimen = specimen;
        resolution.specimen_source = specimen_source;

        tracing::info!(
            %term,
            matched = resolution.matched.len(),
            failed = resolution.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search resolved"
        );
        resolution
    }
}

fn settle<T>(
    lookup: LookupKind,
    result: Result<Option<T>, SubmissionsError>,
    resolution: &mut Resolution,
) -> Option<T> {
    match result {
        Ok(Some(value)) => {
            resolution.matched.push(lookup);
            Some(value)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(%lookup, error = %err, "lookup failed");
            resolution.failures.push(LookupFailure {
                lookup,
                message: err.to_string(),
            });
            None
        }
    }
}

fn panicked() -> SubmissionsError {
    SubmissionsError::Http("lookup thread panicked".to_string())
}
