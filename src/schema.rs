//! Field schemas for the sample summary and the full sample record view.
//!
//! Both views are plain ordered lists of `(wire key, label)` pairs; the
//! rows are produced by [`rows`], so the schema and the rendering rule are
//! tested separately.

use serde::Serialize;

use crate::model::Sample;

/// Rendered in place of any missing value.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
}

const fn field(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label }
}

pub const SUMMARY_FIELDS: &[FieldSpec] = &[
    field("biosampleAccession", "Biosample ID"),
    field("RACK_OR_PLATE_ID", "Rack or Plate ID"),
    field("TUBE_OR_WELL_ID", "Tube or Well ID"),
];

pub const DETAIL_FIELDS: &[FieldSpec] = &[
    field("biosampleAccession", "Biosample ID"),
    field("RACK_OR_PLATE_ID", "Rack or Plate ID"),
    field("TUBE_OR_WELL_ID", "Tube or Well ID"),
    field("TAXON_ID", "Taxonomy ID"),
    field("SCIENTIFIC_NAME", "Scientific Name"),
    field("GENUS", "Genus"),
    field("FAMILY", "Family"),
    field("ORDER_OR_GROUP", "Order or Group"),
    field("COMMON_NAME", "Common Name"),
    field("LIFESTAGE", "Lifestage"),
    field("SEX", "Sex"),
    field("ORGANISM_PART", "Organism Part"),
    field("GAL", "GAL"),
    field("COLLECTED_BY", "Collected by"),
    field("COLLECTOR_AFFILIATION", "Collector Affiliation"),
    field("DATE_OF_COLLECTION", "Date of Collection"),
    field("COLLECTION_LOCATION", "Collection Location"),
    field("DECIMAL_LATITUDE", "Decimal Latitude"),
    field("DECIMAL_LONGITUDE", "Decimal Longitude"),
    field("HABITAT", "Habitat"),
    field("IDENTIFIED_BY", "Identified by"),
    field("IDENTIFIER_AFFILIATION", "Identifier Affiliation"),
    field("VOUCHER_ID", "Voucher ID"),
    field("OTHER_INFORMATION", "Other Information"),
    field("ELEVATION", "Elevation"),
    field("DEPTH", "Depth"),
    field("RELATIONSHIP", "Relationship"),
    field("SYMBIONT", "Symbiont"),
    field("CULTURE_OR_STRAIN_ID", "Culture or Strain ID"),
    field("SERIES", "Series"),
    field("TAXON_REMARKS", "Taxonomy Remarks"),
    field("INFRASPECIFIC_EPITHET", "Infraspecific Epithet"),
    field("COLLECTOR_SAMPLE_ID", "Collector Sample ID"),
    field("GRID_REFERENCE", "Grid Reference"),
    field("TIME_OF_COLLECTION", "Time of Collection"),
    field(
        "DESCRIPTION_OF_COLLECTION_METHOD",
        "Description of Collection Method",
    ),
    field(
        "DIFFICULT_OR_HIGH_PRIORITY_SAMPLE",
        "Difficult or High Priority Sample",
    ),
    field("IDENTIFIED_HOW", "Identified how"),
    field("SPECIMEN_ID_RISK", "Specimen ID Risk"),
    field("PRESERVED_BY", "Preserved by"),
    field("PRESERVER_AFFILIATION", "Preserver Affiliation"),
    field("PRESERVATION_APPROACH", "Preservation Approach"),
    field("PRESERVATIVE_SOLUTION", "Preservation Solution"),
    field(
        "TIME_ELAPSED_FROM_COLLECTION_TO_PRESERVATION",
        "Time Elapsed from Collection to Preservation",
    ),
    field("DATE_OF_PRESERVATION", "Date of Preservation"),
    field("SIZE_OF_TISSUE_IN_TUBE", "Size of Tissue in Tube"),
    field("TISSUE_REMOVED_FOR_BARCODING", "Tissue Removed for Barcoding"),
    field("PLATE_ID_FOR_BARCODING", "Plate ID for Barcoding"),
    field(
        "TUBE_OR_WELL_ID_FOR_BARCODING",
        "Tube or Well ID for Barcoding",
    ),
    field("TISSUE_FOR_BARCODING", "Tissue for Barcoding"),
    field("BARCODE_PLATE_PRESERVATIVE", "Barcode Plate Preservative"),
    field("PURPOSE_OF_SPECIMEN", "Purpose of Specimen"),
    field("HAZARD_GROUP", "Hazard Group"),
    field("REGULATORY_COMPLIANCE", "Regulatory Compliance"),
    field("ORIGINAL_COLLECTION_DATE", "Original Collection Date"),
    field("ORIGINAL_GEOGRAPHIC_LOCATION", "Original Geographic Location"),
    field("BARCODE_HUB", "Barcode HUB"),
    field("tolId", "Tree of Life ID"),
    field("sraAccession", "SRA Accession"),
    field("submissionError", "Submission Error"),
    field("sampleDerivedFrom", "Sample Derived From"),
    field("sampleSameAs", "Sample Same as"),
    field("sampleSymbiontOf", "Sample Symbiont of"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub label: &'static str,
    pub value: String,
}

/// Value shown for `key`: the exact wire value, or [`PLACEHOLDER`] when the
/// field is absent, null, empty or zero.
pub fn display_value(sample: &Sample, key: &str) -> String {
    sample
        .value(key)
        .filter(|value| !value.is_missing())
        .map(|value| value.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn rows(sample: &Sample, schema: &[FieldSpec]) -> Vec<FieldRow> {
    schema
        .iter()
        .map(|spec| FieldRow {
            label: spec.label,
            value: display_value(sample, spec.key),
        })
        .collect()
}
