use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One value of a sample record as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
}

impl FieldValue<'_> {
    /// Empty strings and zero count as missing, like an absent field.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.is_empty(),
            FieldValue::Number(value) => *value == 0,
        }
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(value.as_str())
    }
}

impl From<&i64> for FieldValue<'_> {
    fn from(value: &i64) -> Self {
        FieldValue::Number(*value)
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Number(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! sample_record {
    ($($field:ident: $ty:ty => $key:literal,)*) => {
        /// A sample submission record, decoded from the lookup endpoints.
        ///
        /// Every field is optional on the wire; `null` and a missing key
        /// both decode to `None`.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct Sample {
            $(
                #[serde(rename = $key, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl Sample {
            /// Wire names of every field, in declaration order.
            pub const FIELD_KEYS: &'static [&'static str] = &[$($key),*];

            /// Looks a field up by its wire name.
            pub fn value(&self, key: &str) -> Option<FieldValue<'_>> {
                match key {
                    $($key => self.$field.as_ref().map(FieldValue::from),)*
                    _ => None,
                }
            }
        }
    };
}

sample_record! {
    row: i64 => "row",
    specimen_id: String => "SPECIMEN_ID",
    taxon_id: i64 => "TAXON_ID",
    scientific_name: String => "SCIENTIFIC_NAME",
    genus: String => "GENUS",
    family: String => "FAMILY",
    order_or_group: String => "ORDER_OR_GROUP",
    common_name: String => "COMMON_NAME",
    lifestage: String => "LIFESTAGE",
    sex: String => "SEX",
    organism_part: String => "ORGANISM_PART",
    gal: String => "GAL",
    gal_sample_id: String => "GAL_SAMPLE_ID",
    collected_by: String => "COLLECTED_BY",
    collector_affiliation: String => "COLLECTOR_AFFILIATION",
    date_of_collection: String => "DATE_OF_COLLECTION",
    collection_location: String => "COLLECTION_LOCATION",
    decimal_latitude: String => "DECIMAL_LATITUDE",
    decimal_longitude: String => "DECIMAL_LONGITUDE",
    habitat: String => "HABITAT",
    identified_by: String => "IDENTIFIED_BY",
    identifier_affiliation: String => "IDENTIFIER_AFFILIATION",
    voucher_id: String => "VOUCHER_ID",
    other_information: String => "OTHER_INFORMATION",
    elevation: String => "ELEVATION",
    depth: String => "DEPTH",
    relationship: String => "RELATIONSHIP",
    symbiont: String => "SYMBIONT",
    culture_or_strain_id: String => "CULTURE_OR_STRAIN_ID",
    series: String => "SERIES",
    rack_or_plate_id: String => "RACK_OR_PLATE_ID",
    tube_or_well_id: String => "TUBE_OR_WELL_ID",
    taxon_remarks: String => "TAXON_REMARKS",
    infraspecific_epithet: String => "INFRASPECIFIC_EPITHET",
    collector_sample_id: String => "COLLECTOR_SAMPLE_ID",
    grid_reference: String => "GRID_REFERENCE",
    time_of_collection: String => "TIME_OF_COLLECTION",
    description_of_collection_method: String => "DESCRIPTION_OF_COLLECTION_METHOD",
    difficult_or_high_priority_sample: String => "DIFFICULT_OR_HIGH_PRIORITY_SAMPLE",
    identified_how: String => "IDENTIFIED_HOW",
    specimen_id_risk: String => "SPECIMEN_ID_RISK",
    preserved_by: String => "PRESERVED_BY",
    preserver_affiliation: String => "PRESERVER_AFFILIATION",
    preservation_approach: String => "PRESERVATION_APPROACH",
    preservative_solution: String => "PRESERVATIVE_SOLUTION",
    time_elapsed_from_collection_to_preservation: String => "TIME_ELAPSED_FROM_COLLECTION_TO_PRESERVATION",
    date_of_preservation: String => "DATE_OF_PRESERVATION",
    size_of_tissue_in_tube: String => "SIZE_OF_TISSUE_IN_TUBE",
    tissue_removed_for_barcoding: String => "TISSUE_REMOVED_FOR_BARCODING",
    plate_id_for_barcoding: String => "PLATE_ID_FOR_BARCODING",
    tube_or_well_id_for_barcoding: String => "TUBE_OR_WELL_ID_FOR_BARCODING",
    tissue_for_barcoding: String => "TISSUE_FOR_BARCODING",
    barcode_plate_preservative: String => "BARCODE_PLATE_PRESERVATIVE",
    purpose_of_specimen: String => "PURPOSE_OF_SPECIMEN",
    hazard_group: String => "HAZARD_GROUP",
    regulatory_compliance: String => "REGULATORY_COMPLIANCE",
    original_collection_date: String => "ORIGINAL_COLLECTION_DATE",
    original_geographic_location: String => "ORIGINAL_GEOGRAPHIC_LOCATION",
    barcode_hub: String => "BARCODE_HUB",
    tol_id: String => "tolId",
    biosample_accession: String => "biosampleAccession",
    sra_accession: String => "sraAccession",
    submission_accession: String => "submissionAccession",
    submission_error: String => "submissionError",
    sample_derived_from: String => "sampleDerivedFrom",
    sample_same_as: String => "sampleSameAs",
    sample_symbiont_of: String => "sampleSymbiontOf",
}

impl Sample {
    /// The assigned biosample accession, if one has been issued yet.
    pub fn accession(&self) -> Option<&str> {
        self.biosample_accession
            .as_deref()
            .filter(|value| !value.is_empty())
    }
}

/// A physical specimen under its two identifier namespaces, with the
/// samples taken from it in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    #[serde(default)]
    pub specimen_id: Option<String>,
    #[serde(default)]
    pub biospecimen_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub samples: Vec<Sample>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Sample>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Sample>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_sample_with_nulls_and_missing_fields() {
        let sample: Sample = serde_json::from_str(
            r#"{"row": 3, "TAXON_ID": 9606, "SCIENTIFIC_NAME": "Homo sapiens", "GENUS": null}"#,
        )
        .unwrap();
        assert_eq!(sample.row, Some(3));
        assert_eq!(sample.taxon_id, Some(9606));
        assert_eq!(sample.scientific_name.as_deref(), Some("Homo sapiens"));
        assert_eq!(sample.genus, None);
        assert_eq!(sample.biosample_accession, None);
    }

    #[test]
    fn value_by_wire_key() {
        let sample = Sample {
            taxon_id: Some(6344),
            tol_id: Some("wuAreMari1".to_string()),
            ..Sample::default()
        };
        assert_eq!(sample.value("TAXON_ID"), Some(FieldValue::Number(6344)));
        assert_eq!(sample.value("tolId"), Some(FieldValue::Text("wuAreMari1")));
        assert_eq!(sample.value("GENUS"), None);
        assert_eq!(sample.value("NOT_A_FIELD"), None);
    }

    #[test]
    fn empty_accession_is_absent() {
        let sample = Sample {
            biosample_accession: Some(String::new()),
            ..Sample::default()
        };
        assert_eq!(sample.accession(), None);
    }

    #[test]
    fn decode_specimen_without_samples() {
        let specimen: Specimen =
            serde_json::from_str(r#"{"specimenId": "ABC123", "biospecimenId": "BIO456"}"#)
                .unwrap();
        assert_eq!(specimen.specimen_id.as_deref(), Some("ABC123"));
        assert_eq!(specimen.biospecimen_id.as_deref(), Some("BIO456"));
        assert!(specimen.samples.is_empty());

        let specimen: Specimen =
            serde_json::from_str(r#"{"specimenId": "ABC123", "samples": null}"#).unwrap();
        assert!(specimen.samples.is_empty());
    }

    #[test]
    fn field_values_missing_rule() {
        assert!(FieldValue::Text("").is_missing());
        assert!(FieldValue::Number(0).is_missing());
        assert!(!FieldValue::Text("0").is_missing());
        assert!(!FieldValue::Number(7).is_missing());
    }
}
