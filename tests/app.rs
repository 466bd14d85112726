use std::sync::Mutex;

use assert_matches::assert_matches;

use submissions_search::app::{App, ProgressEvent, ProgressSink};
use submissions_search::client::SubmissionsClient;
use submissions_search::domain::SearchTerm;
use submissions_search::environment::Environment;
use submissions_search::error::SubmissionsError;
use submissions_search::model::{Sample, Specimen};
use submissions_search::output::{JsonOutput, TextOutput};

#[derive(Default)]
struct MockSubmissions {
    sample: Option<Sample>,
    environment: Option<Result<Option<String>, String>>,
    offline: bool,
}

impl SubmissionsClient for MockSubmissions {
    fn fetch_sample(&self, _term: &SearchTerm) -> Result<Option<Sample>, SubmissionsError> {
        if self.offline {
            return Err(SubmissionsError::Http("connection refused".to_string()));
        }
        Ok(self.sample.clone())
    }

    fn fetch_specimen_by_specimen_id(
        &self,
        _term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError> {
        if self.offline {
            return Err(SubmissionsError::Http("connection refused".to_string()));
        }
        Ok(None)
    }

    fn fetch_specimen_by_biospecimen_id(
        &self,
        _term: &SearchTerm,
    ) -> Result<Option<Specimen>, SubmissionsError> {
        Err(SubmissionsError::Decode("expected value at line 1".to_string()))
    }

    fn fetch_environment(&self) -> Result<Option<String>, SubmissionsError> {
        match &self.environment {
            Some(Ok(name)) => Ok(name.clone()),
            Some(Err(message)) => Err(SubmissionsError::Http(message.clone())),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

fn found_sample() -> Sample {
    Sample {
        biosample_accession: Some("SAMEA7".to_string()),
        tube_or_well_id: Some("A1".to_string()),
        ..Sample::default()
    }
}

#[test]
fn search_reports_resolution_and_progress() {
    let app = App::new(MockSubmissions {
        sample: Some(found_sample()),
        ..MockSubmissions::default()
    });
    let sink = RecordingSink::default();
    let report = app.search(" SAMEA7 ", &sink).unwrap();

    assert!(report.found());
    assert_eq!(report.term.as_str(), "SAMEA7");
    assert_eq!(report.resolution.sample, Some(found_sample()));
    assert_eq!(report.resolution.failures.len(), 1);
    assert!(chrono::DateTime::parse_from_rfc3339(&report.searched_at).is_ok());

    let messages = sink.messages.lock().unwrap();
    assert!(messages[0].starts_with("phase=Resolve;"));
    assert!(messages.last().unwrap().contains("matched=1 failed=1"));
}

#[test]
fn blank_search_is_rejected() {
    let app = App::new(MockSubmissions::default());
    let result = app.search("   ", &JsonOutput);
    assert_matches!(result, Err(SubmissionsError::EmptySearchTerm));
}

#[test]
fn unreachable_api_fails_the_search_with_exit_code_3() {
    let app = App::new(MockSubmissions {
        offline: true,
        ..MockSubmissions::default()
    });
    let report = app.search("SAMEA7", &JsonOutput).unwrap();
    assert!(!report.found());
    assert_eq!(report.resolution.failures.len(), 3);

    let error = report.ensure_reachable().unwrap_err();
    assert_matches!(error, SubmissionsError::LookupsFailed(3));
    assert_eq!(error.exit_code(), 3);
}

#[test]
fn partial_failure_with_nothing_found_still_fails() {
    // only the biospecimen lookup fails, the others answer "not found"
    let app = App::new(MockSubmissions::default());
    let report = app.search("missing", &JsonOutput).unwrap();
    assert!(!report.found());
    assert_matches!(
        report.ensure_reachable(),
        Err(SubmissionsError::LookupsFailed(1))
    );
}

#[test]
fn found_result_is_reachable_despite_failures() {
    let app = App::new(MockSubmissions {
        sample: Some(found_sample()),
        ..MockSubmissions::default()
    });
    let report = app.search("SAMEA7", &JsonOutput).unwrap();
    assert!(report.resolution.has_failures());
    assert_matches!(report.ensure_reachable(), Ok(()));
}

#[test]
fn exit_codes_by_error_kind() {
    assert_eq!(SubmissionsError::EmptySearchTerm.exit_code(), 2);
    assert_eq!(SubmissionsError::ConfigParse("bad".to_string()).exit_code(), 2);
    assert_eq!(SubmissionsError::Http("refused".to_string()).exit_code(), 3);
    assert_eq!(SubmissionsError::Output("closed".to_string()).exit_code(), 1);
}

#[test]
fn search_report_serializes_flat() {
    let app = App::new(MockSubmissions {
        sample: Some(found_sample()),
        ..MockSubmissions::default()
    });
    let report = app.search("SAMEA7", &JsonOutput).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["term"], "SAMEA7");
    assert_eq!(json["sample"]["biosampleAccession"], "SAMEA7");
    assert_eq!(json["specimen"], serde_json::Value::Null);
    assert_eq!(json["matched"][0], "sample_by_accession");
    assert_eq!(json["failures"][0]["lookup"], "specimen_by_biospecimen_id");
}

#[test]
fn text_output_uses_page_rendering() {
    let app = App::new(MockSubmissions {
        sample: Some(found_sample()),
        ..MockSubmissions::default()
    });
    let report = app.search("SAMEA7", &JsonOutput).unwrap();
    let text = TextOutput::render_search(&report, false);
    assert!(text.starts_with("Sample Found"));
    assert!(text.contains("A1"));
    assert!(text.contains("1 lookup failed"));
}

#[test]
fn environment_defaults_to_production() {
    let unreachable = App::new(MockSubmissions {
        environment: Some(Err("connection refused".to_string())),
        ..MockSubmissions::default()
    });
    assert_eq!(unreachable.environment(&JsonOutput), Environment::default());

    let unnamed = App::new(MockSubmissions::default());
    assert_eq!(unnamed.environment(&JsonOutput).brand(), "Submissions");

    let staging = App::new(MockSubmissions {
        environment: Some(Ok(Some("staging".to_string()))),
        ..MockSubmissions::default()
    });
    let environment = staging.environment(&JsonOutput);
    assert!(!environment.is_production());
    assert_eq!(environment.brand(), "Submissions-staging");
}
