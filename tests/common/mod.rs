//! DICOM fixtures shared by the integration tests.

use std::path::Path;

use dicom::core::value::PrimitiveValue;
use dicom::core::{DataElement, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};

/// Writes a 2x3 CT slice at `z` whose stored pixels all equal `fill`.
///
/// Every slice has Pixel Spacing `0.75\0.5`, Slice Thickness 3 and Rescale
/// Intercept -1000.
pub fn write_slice(path: &Path, study_uid: &str, z: f64, fill: u16) {
    let pixels: Vec<u8> = std::iter::repeat_n(fill, 6)
        .flat_map(u16::to_le_bytes)
        .collect();
    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(uids::CT_IMAGE_STORAGE)),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from(format!("1.2.3.{fill}"))),
        DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from("ANON")),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from(study_uid)),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3.9")),
        DataElement::new(tags::SLICE_THICKNESS, VR::DS, PrimitiveValue::from("3")),
        DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::Strs(vec!["0".to_string(), "0".to_string(), z.to_string()].into()),
        ),
        DataElement::new(tags::SLICE_LOCATION, VR::DS, PrimitiveValue::from(z.to_string())),
        DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::Strs(vec!["0.75".to_string(), "0.5".to_string()].into()),
        ),
        DataElement::new(tags::RESCALE_SLOPE, VR::DS, PrimitiveValue::from("1")),
        DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, PrimitiveValue::from("-1000")),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, PrimitiveValue::from("MONOCHROME2")),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(2_u16)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(3_u16)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
        DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::from(pixels)),
    ]);
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(format!("1.2.3.{fill}")),
        )
        .unwrap();
    file.write_to_file(path).unwrap();
}
