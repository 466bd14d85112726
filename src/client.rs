use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ResolvedConfig;
use crate::domain::{LookupKind, SearchTerm};
use crate::error::SubmissionsError;
use crate::model::{Sample, Specimen};

/// Lookups against the submissions API.
///
/// A lookup that the server answers with a non-success status yields
/// `Ok(None)`; only transport and decoding problems are errors.
pub trait SubmissionsClient: Send + Sync {
    fn fetch_sample(&self, term: &SearchTerm) -> Result<Option<Sample>, SubmissionsError>;
    fn fetch_specimen_by_specimen_id(
        &self,
        term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError>;
    fn fetch_specimen_by_biospecimen_id(
        &self,
        term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError>;
    fn fetch_environment(&self) -> Result<Option<String>, SubmissionsError>;
}

#[derive(Clone)]
pub struct SubmissionsHttpClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct EnvironmentBody {
    #[serde(default)]
    environment: Option<String>,
}

impl SubmissionsHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, SubmissionsError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| SubmissionsError::InvalidBaseUrl(format!("{}: {err}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SubmissionsError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("subs-search/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SubmissionsError::Http(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| SubmissionsError::Http(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint for `kind`, with the term encoded as one path segment.
    pub fn lookup_url(&self, kind: LookupKind, term: &SearchTerm) -> Url {
        self.url_with_segments(&kind.path_segments(term))
    }

    pub fn environment_url(&self) -> Url {
        self.url_with_segments(&["api", "v1", "environment"])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, SubmissionsError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| SubmissionsError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "lookup returned no result");
            return Ok(None);
        }
        // a null body is another way of saying "not found"
        response
            .json::<Option<T>>()
            .map_err(|err| SubmissionsError::Decode(err.to_string()))
    }
}

impl SubmissionsClient for SubmissionsHttpClient {
    fn fetch_sample(&self, term: &SearchTerm) -> Result<Option<Sample>, SubmissionsError> {
        self.get_json(self.lookup_url(LookupKind::SampleByAccession, term))
    }

    fn fetch_specimen_by_specimen_id(
        &self,
        term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError> {
        self.get_json(self.lookup_url(LookupKind::SpecimenBySpecimenId, term))
    }

    fn fetch_specimen_by_biospecimen_id(
        &self,
        term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError> {
        self.get_json(self.lookup_url(LookupKind::SpecimenByBiospecimenId, term))
    }

    fn fetch_environment(&self) -> Result<Option<String>, SubmissionsError> {
        let body: Option<EnvironmentBody> = self.get_json(self.environment_url())?;
        Ok(body.and_then(|body| body.environment))
    }
}
