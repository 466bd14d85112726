//! Sample and specimen result views, shared by the plain-text printer and
//! the terminal UI.

use std::collections::HashMap;
use std::fmt::{self, Write};

use serde::Serialize;

use crate::model::{Sample, Specimen};
use crate::schema::{self, DETAIL_FIELDS, FieldRow, PLACEHOLDER, SUMMARY_FIELDS};
use crate::search::PageView;

pub const NO_RESULTS: &str = "No results found";
pub const SAMPLE_FOUND: &str = "Sample Found";
pub const SPECIMEN_FOUND: &str = "Specimen found.";
pub const WITH_SAMPLES: &str = "With the following samples:";
pub const NO_SPECIMEN_SAMPLES: &str = "No samples found for this specimen.";
pub const DETAIL_TITLE: &str = "Sample Details";

/// Identity of a sample within a specimen's list.
///
/// Accessions are neither guaranteed present nor unique before
/// submission, so a sample whose accession is missing or shared with a
/// sibling is keyed by its position instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SampleKey {
    Accession(String),
    Position(usize),
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKey::Accession(accession) => f.write_str(accession),
            SampleKey::Position(index) => write!(f, "#{}", index + 1),
        }
    }
}

pub fn sample_keys(samples: &[Sample]) -> Vec<SampleKey> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for accession in samples.iter().filter_map(Sample::accession) {
        *counts.entry(accession).or_default() += 1;
    }
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| match sample.accession() {
            Some(accession) if counts.get(accession) == Some(&1) => {
                SampleKey::Accession(accession.to_string())
            }
            _ => SampleKey::Position(index),
        })
        .collect()
}

/// Open/closed state of one sample's full record view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCard {
    detail_open: bool,
}

impl SampleCard {
    pub fn is_open(&self) -> bool {
        self.detail_open
    }

    pub fn open(&mut self) {
        self.detail_open = true;
    }

    pub fn close(&mut self) {
        self.detail_open = false;
    }
}

pub fn sample_summary(sample: &Sample) -> Vec<FieldRow> {
    schema::rows(sample, SUMMARY_FIELDS)
}

pub fn sample_detail(sample: &Sample) -> Vec<FieldRow> {
    schema::rows(sample, DETAIL_FIELDS)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleList<'a> {
    Empty,
    Items(Vec<(SampleKey, &'a Sample)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecimenView<'a> {
    pub specimen_id: &'a str,
    pub biospecimen_id: &'a str,
    pub samples: SampleList<'a>,
}

pub fn specimen_view(specimen: &Specimen) -> SpecimenView<'_> {
    let samples = if specimen.samples.is_empty() {
        SampleList::Empty
    } else {
        SampleList::Items(
            sample_keys(&specimen.samples)
                .into_iter()
                .zip(specimen.samples.iter())
                .collect(),
        )
    };
    SpecimenView {
        specimen_id: non_empty_or_placeholder(specimen.specimen_id.as_deref()),
        biospecimen_id: non_empty_or_placeholder(specimen.biospecimen_id.as_deref()),
        samples,
    }
}

fn non_empty_or_placeholder(value: Option<&str>) -> &str {
    value.filter(|value| !value.is_empty()).unwrap_or(PLACEHOLDER)
}

/// Plain-text rendering of a search page. With `details` every sample is
/// followed by its full record.
pub fn render_page(view: &PageView<'_>, details: bool) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_page(&mut out, view, details);
    out
}

fn write_page(out: &mut String, view: &PageView<'_>, details: bool) -> fmt::Result {
    match view {
        PageView::Idle => {}
        PageView::NoResults { failures } => {
            writeln!(out, "{NO_RESULTS}")?;
            write_failures(out, failures.len())?;
        }
        PageView::Results {
            sample,
            specimen,
            failures,
        } => {
            if let Some(sample) = sample {
                writeln!(out, "{SAMPLE_FOUND}")?;
                write_sample(out, sample, details, "")?;
            }
            if let Some(specimen) = specimen {
                if sample.is_some() {
                    writeln!(out)?;
                }
                write_specimen(out, specimen, details)?;
            }
            write_failures(out, failures.len())?;
        }
    }
    Ok(())
}

fn write_specimen(out: &mut String, view: &SpecimenView<'_>, details: bool) -> fmt::Result {
    writeln!(out, "{SPECIMEN_FOUND}")?;
    write_rows(
        out,
        &[
            ("Specimen ID", view.specimen_id),
            ("Biospecimen ID", view.biospecimen_id),
        ],
        "",
    )?;
    match &view.samples {
        SampleList::Empty => writeln!(out, "{NO_SPECIMEN_SAMPLES}"),
        SampleList::Items(items) => {
            writeln!(out, "{WITH_SAMPLES}")?;
            for (key, sample) in items {
                writeln!(out, "  [{key}]")?;
                write_sample(out, sample, details, "    ")?;
            }
            Ok(())
        }
    }
}

fn write_sample(out: &mut String, sample: &Sample, details: bool, indent: &str) -> fmt::Result {
    let rows = if details {
        sample_detail(sample)
    } else {
        sample_summary(sample)
    };
    let pairs: Vec<(&str, &str)> = rows
        .iter()
        .map(|row| (row.label, row.value.as_str()))
        .collect();
    write_rows(out, &pairs, indent)
}

fn write_rows(out: &mut String, rows: &[(&str, &str)], indent: &str) -> fmt::Result {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        writeln!(out, "{indent}{label:<width$}  {value}")?;
    }
    Ok(())
}

fn write_failures(out: &mut String, count: usize) -> fmt::Result {
    if count > 0 {
        writeln!(out, "{}", failure_notice(count))?;
    }
    Ok(())
}

pub fn failure_notice(count: usize) -> String {
    let noun = if count == 1 { "lookup" } else { "lookups" };
    format!("Warning: {count} {noun} failed; results may be incomplete")
}
