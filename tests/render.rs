use submissions_search::domain::LookupKind;
use submissions_search::model::{Sample, Specimen};
use submissions_search::render::{
    self, NO_RESULTS, NO_SPECIMEN_SAMPLES, SAMPLE_FOUND, SPECIMEN_FOUND, SampleKey, SampleList,
    WITH_SAMPLES,
};
use submissions_search::resolver::{LookupFailure, Resolution};
use submissions_search::schema::{DETAIL_FIELDS, PLACEHOLDER, SUMMARY_FIELDS};
use submissions_search::search::SearchPage;

fn sample(accession: &str, rack: &str) -> Sample {
    Sample {
        biosample_accession: Some(accession.to_string()),
        rack_or_plate_id: Some(rack.to_string()),
        ..Sample::default()
    }
}

fn rendered(resolution: Resolution, details: bool) -> String {
    let mut page = SearchPage::new();
    let ticket = page.submit("term").unwrap();
    page.apply(ticket.seq, resolution);
    render::render_page(&page.view(), details)
}

#[test]
fn idle_page_renders_nothing() {
    assert_eq!(render::render_page(&SearchPage::new().view(), false), "");
}

#[test]
fn empty_specimen_shows_explicit_message() {
    let specimen = Specimen {
        specimen_id: Some("ABC123".to_string()),
        biospecimen_id: Some("BIO456".to_string()),
        samples: Vec::new(),
    };
    let view = render::specimen_view(&specimen);
    assert_eq!(view.samples, SampleList::Empty);

    let text = rendered(
        Resolution {
            specimen: Some(specimen),
            specimen_source: Some(LookupKind::SpecimenBySpecimenId),
            ..Resolution::default()
        },
        false,
    );
    assert!(text.contains(SPECIMEN_FOUND));
    assert!(text.contains("ABC123"));
    assert!(text.contains("BIO456"));
    assert!(text.contains(NO_SPECIMEN_SAMPLES));
    assert!(!text.contains(SAMPLE_FOUND));
    assert!(!text.contains(NO_RESULTS));
    assert!(!text.contains(WITH_SAMPLES));
}

#[test]
fn specimen_lists_every_sample_in_order() {
    let samples = vec![
        sample("SAMEA3", "P3"),
        sample("SAMEA1", "P1"),
        sample("", "P2"),
    ];
    let specimen = Specimen {
        specimen_id: Some("SPEC1".to_string()),
        biospecimen_id: None,
        samples: samples.clone(),
    };

    match render::specimen_view(&specimen).samples {
        SampleList::Items(items) => {
            assert_eq!(items.len(), 3);
            let keys: Vec<_> = items.iter().map(|(key, _)| key.clone()).collect();
            assert_eq!(
                keys,
                vec![
                    SampleKey::Accession("SAMEA3".to_string()),
                    SampleKey::Accession("SAMEA1".to_string()),
                    SampleKey::Position(2),
                ]
            );
            let listed: Vec<&Sample> = items.iter().map(|(_, sample)| *sample).collect();
            assert_eq!(listed, samples.iter().collect::<Vec<_>>());
        }
        SampleList::Empty => panic!("expected samples"),
    }

    let text = rendered(
        Resolution {
            specimen: Some(specimen),
            ..Resolution::default()
        },
        false,
    );
    assert!(text.contains(WITH_SAMPLES));
    assert!(!text.contains(NO_SPECIMEN_SAMPLES));
    let p3 = text.find("P3").unwrap();
    let p1 = text.find("P1").unwrap();
    let p2 = text.find("P2").unwrap();
    assert!(p3 < p1 && p1 < p2);
    assert_eq!(text.matches("Rack or Plate ID").count(), 3);
    // missing biospecimen ID
    assert!(text.lines().any(|line| line.starts_with("Biospecimen ID")
        && line.trim_end().ends_with(PLACEHOLDER)));
}

#[test]
fn no_results_with_failure_warning() {
    let text = rendered(
        Resolution {
            failures: vec![
                LookupFailure {
                    lookup: LookupKind::SampleByAccession,
                    message: "timed out".to_string(),
                },
                LookupFailure {
                    lookup: LookupKind::SpecimenBySpecimenId,
                    message: "timed out".to_string(),
                },
            ],
            ..Resolution::default()
        },
        false,
    );
    assert!(text.starts_with(NO_RESULTS));
    assert!(text.contains("2 lookups failed; results may be incomplete"));
}

#[test]
fn details_switch_from_summary_to_full_record() {
    let found = Sample {
        taxon_id: Some(0),
        habitat: Some("woodland".to_string()),
        ..sample("SAMEA1", "P1")
    };
    let resolution = Resolution {
        sample: Some(found.clone()),
        ..Resolution::default()
    };

    let summary = rendered(resolution.clone(), false);
    assert_eq!(summary.lines().count(), 1 + SUMMARY_FIELDS.len());
    assert!(!summary.contains("Habitat"));

    let details = rendered(resolution, true);
    assert_eq!(details.lines().count(), 1 + DETAIL_FIELDS.len());
    assert!(details.lines().any(|line| line.starts_with("Habitat")
        && line.trim_end().ends_with("woodland")));
    assert!(details.lines().any(|line| line.starts_with("Taxonomy ID")
        && line.trim_end().ends_with(PLACEHOLDER)));

    let rows = render::sample_detail(&found);
    assert_eq!(rows.len(), DETAIL_FIELDS.len());
    assert_eq!(rows[0].value, "SAMEA1");
}

#[test]
fn failure_notice_wording() {
    assert_eq!(
        render::failure_notice(1),
        "Warning: 1 lookup failed; results may be incomplete"
    );
}
