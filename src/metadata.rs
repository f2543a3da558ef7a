//! Total accessors over the attributes of a DICOM data set.
//!
//! Missing tags are routine in real scan data, so none of the getters here
//! fail: each one falls back to a documented default instead.

use std::fmt;

use dicom::core::Tag;
use dicom::object::InMemDicomObject;
use dicom_dictionary_std::tags;
use serde::Serialize;
use serde_json::Value;

/// Private tag holding a vendor JSON block.
pub const EMBEDDED_JSON: Tag = Tag(0x6819, 0x0011);

/// Reads `tag` as a number, or returns `default`.
///
/// Multi-valued elements yield their first value.
pub fn get_as_float(dcm: &InMemDicomObject, tag: Tag, default: f64) -> f64 {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
        .unwrap_or(default)
}

/// Reads `tag` as a trimmed string, or returns an empty string.
pub fn get_as_string(dcm: &InMemDicomObject, tag: Tag) -> String {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
        .unwrap_or_default()
}

/// Reads `tag` as a list of exactly `length` strings.
///
/// Missing values are padded with empty strings; surplus values are dropped.
pub fn get_as_fixed_list(dcm: &InMemDicomObject, tag: Tag, length: usize) -> Vec<String> {
    let mut values: Vec<String> = dcm
        .element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_str().ok())
        .map(|strs| strs.iter().map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    values.truncate(length);
    values.resize(length, String::new());
    values
}

/// Reads `item_tag` from the first item of the sequence `sequence_tag`, or
/// returns an empty string.
pub fn get_item_string(dcm: &InMemDicomObject, sequence_tag: Tag, item_tag: Tag) -> String {
    dcm.element(sequence_tag)
        .ok()
        .and_then(|seq| seq.items())
        .and_then(|items| items.first())
        .map(|item| get_as_string(item, item_tag))
        .unwrap_or_default()
}

/// Parses the value of `tag` as JSON text, or returns an empty JSON array.
pub fn get_as_json(dcm: &InMemDicomObject, tag: Tag) -> Value {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .and_then(|text| serde_json::from_str(text.trim_end_matches('\0')).ok())
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// Identity shared by every slice of one acquisition series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SeriesIdentity {
    pub patient_id: String,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
}

/// Names one component of a [`SeriesIdentity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    PatientId,
    StudyInstanceUid,
    SeriesInstanceUid,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityField::PatientId => "PatientID",
            IdentityField::StudyInstanceUid => "StudyInstanceUID",
            IdentityField::SeriesInstanceUid => "SeriesInstanceUID",
        };
        f.write_str(name)
    }
}

impl SeriesIdentity {
    pub fn from_object(dcm: &InMemDicomObject) -> Self {
        Self {
            patient_id: get_as_string(dcm, tags::PATIENT_ID),
            study_instance_uid: get_as_string(dcm, tags::STUDY_INSTANCE_UID),
            series_instance_uid: get_as_string(dcm, tags::SERIES_INSTANCE_UID),
        }
    }

    /// First component that differs from `other`, with both values.
    pub fn first_difference<'a>(
        &'a self,
        other: &'a Self,
    ) -> Option<(IdentityField, &'a str, &'a str)> {
        [
            (IdentityField::PatientId, &self.patient_id, &other.patient_id),
            (
                IdentityField::StudyInstanceUid,
                &self.study_instance_uid,
                &other.study_instance_uid,
            ),
            (
                IdentityField::SeriesInstanceUid,
                &self.series_instance_uid,
                &other.series_instance_uid,
            ),
        ]
        .into_iter()
        .find(|(_, ours, theirs)| ours != theirs)
        .map(|(field, ours, theirs)| (field, ours.as_str(), theirs.as_str()))
    }
}

/// Descriptive metadata of a series, read from one of its slices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    #[serde(flatten)]
    pub identity: SeriesIdentity,
    pub patient_name: String,
    pub study_id: String,
    pub study_description: String,
    pub series_description: String,
    pub number_of_slices: usize,
    pub slice_thickness: String,
    pub pixel_spacing: Vec<String>,
    pub acquisition_date: String,
    pub acquisition_date_time: String,
    pub institution_name: String,
    pub institution_code: String,
    pub manufacturer: String,
    pub manufacturer_model_name: String,
    pub window_center: String,
    pub window_width: String,
    pub image_orientation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_json: Option<Value>,
}

impl SeriesSummary {
    /// Collects the summary fields from `dcm`.
    ///
    /// The vendor JSON block is only parsed when `parse_json` is set.
    pub fn from_object(dcm: &InMemDicomObject, number_of_slices: usize, parse_json: bool) -> Self {
        Self {
            identity: SeriesIdentity::from_object(dcm),
            patient_name: get_as_string(dcm, tags::PATIENT_NAME),
            study_id: get_as_string(dcm, tags::STUDY_ID),
            study_description: get_as_string(dcm, tags::STUDY_DESCRIPTION),
            series_description: get_as_string(dcm, tags::SERIES_DESCRIPTION),
            number_of_slices,
            slice_thickness: get_as_string(dcm, tags::SLICE_THICKNESS),
            pixel_spacing: get_as_fixed_list(dcm, tags::PIXEL_SPACING, 2),
            acquisition_date: get_as_string(dcm, tags::ACQUISITION_DATE),
            acquisition_date_time: get_as_string(dcm, tags::ACQUISITION_DATE_TIME),
            institution_name: get_as_string(dcm, tags::INSTITUTION_NAME),
            institution_code: get_item_string(
                dcm,
                tags::INSTITUTION_CODE_SEQUENCE,
                tags::CODE_VALUE,
            ),
            manufacturer: get_as_string(dcm, tags::MANUFACTURER),
            manufacturer_model_name: get_as_string(dcm, tags::MANUFACTURER_MODEL_NAME),
            window_center: get_as_string(dcm, tags::WINDOW_CENTER),
            window_width: get_as_string(dcm, tags::WINDOW_WIDTH),
            image_orientation: get_as_string(dcm, tags::IMAGE_ORIENTATION_PATIENT),
            embedded_json: parse_json.then(|| get_as_json(dcm, EMBEDDED_JSON)),
        }
    }
}
