//! Synthetic slices for unit tests.

use dicom::core::value::PrimitiveValue;
use dicom::core::{DataElement, VR};
use dicom::object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};

use crate::slice::SliceRecord;

pub(crate) struct SliceSpec {
    pub patient_id: &'static str,
    pub study_uid: &'static str,
    pub series_uid: &'static str,
    pub position_z: Option<f64>,
    pub slice_location: Option<f64>,
    pub rows: u16,
    pub columns: u16,
    /// Stored values, row-major. Defaults to `0..rows * columns`.
    pub pixels: Option<Vec<u16>>,
    pub with_rescale: bool,
    pub slope: f64,
    pub intercept: f64,
    pub pixel_spacing: Option<(f64, f64)>,
    pub slice_thickness: Option<f64>,
    pub transfer_syntax: &'static str,
}

impl Default for SliceSpec {
    fn default() -> Self {
        Self {
            patient_id: "PAT-001",
            study_uid: "1.2.826.0.1.1",
            series_uid: "1.2.826.0.1.1.2",
            position_z: Some(0.0),
            slice_location: Some(0.0),
            rows: 2,
            columns: 2,
            pixels: None,
            with_rescale: true,
            slope: 1.0,
            intercept: 0.0,
            pixel_spacing: Some((0.5, 0.5)),
            slice_thickness: Some(1.0),
            transfer_syntax: uids::EXPLICIT_VR_LITTLE_ENDIAN,
        }
    }
}

fn ds(value: f64) -> PrimitiveValue {
    PrimitiveValue::from(value.to_string())
}

pub(crate) fn synthetic_object(spec: &SliceSpec) -> DefaultDicomObject {
    let pixels = spec
        .pixels
        .clone()
        .unwrap_or_else(|| (0..spec.rows * spec.columns).collect());
    let pixel_bytes: Vec<u8> = pixels.iter().flat_map(|v| v.to_le_bytes()).collect();

    let mut obj = InMemDicomObject::from_element_iter([
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(uids::CT_IMAGE_STORAGE)),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.826.0.1.1.2.3")),
        DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from(spec.patient_id)),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from(spec.study_uid)),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from(spec.series_uid)),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(spec.rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(spec.columns)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
        DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::from(pixel_bytes)),
    ]);

    if let Some(z) = spec.position_z {
        obj.put(DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::Strs(vec!["-120".to_string(), "-95.5".to_string(), z.to_string()].into()),
        ));
    }
    if let Some(location) = spec.slice_location {
        obj.put(DataElement::new(tags::SLICE_LOCATION, VR::DS, ds(location)));
    }
    if spec.with_rescale {
        obj.put(DataElement::new(tags::RESCALE_SLOPE, VR::DS, ds(spec.slope)));
        obj.put(DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, ds(spec.intercept)));
    }
    if let Some((row, column)) = spec.pixel_spacing {
        obj.put(DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::Strs(vec![row.to_string(), column.to_string()].into()),
        ));
    }
    if let Some(thickness) = spec.slice_thickness {
        obj.put(DataElement::new(tags::SLICE_THICKNESS, VR::DS, ds(thickness)));
    }

    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(spec.transfer_syntax)
            .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
            .media_storage_sop_instance_uid("1.2.826.0.1.1.2.3"),
    )
    .expect("synthetic slice should have valid file meta")
}

pub(crate) fn synthetic_slice(spec: &SliceSpec) -> SliceRecord {
    SliceRecord::from_object(synthetic_object(spec))
}
