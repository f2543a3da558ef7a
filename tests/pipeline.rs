mod common;

use std::fs;

use byteorder::{ByteOrder, LittleEndian};
use common::write_slice;
use dicom_stack::{
    LoadError, NiftiWriter, ReadMode, SeriesLoader, SpacingStrategy, VolumeAssembler,
    VolumeWriter,
};
use flate2::read::GzDecoder;
use std::io::Read;

#[test]
fn test_directory_to_nifti() {
    let input = tempfile::tempdir().unwrap();
    fs::create_dir(input.path().join("nested")).unwrap();
    // discovery order deliberately differs from position order
    write_slice(&input.path().join("a.dcm"), "1.2.3", 6.0, 1003);
    write_slice(&input.path().join("b.dcm"), "1.2.3", 0.0, 1001);
    write_slice(&input.path().join("nested").join("c.dcm"), "1.2.3", 3.0, 1002);
    fs::write(input.path().join("README.txt"), "not a DICOM file").unwrap();

    let series = SeriesLoader::load_from_directory(input.path(), ReadMode::Full).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.collisions(), 0);

    let volume = VolumeAssembler::new(SpacingStrategy::Robust)
        .assemble(series)
        .unwrap();
    assert_eq!(volume.dim(), (3, 2, 3));
    assert_eq!(volume.spacing(), (0.75, 0.5, 3.0));
    assert_eq!(volume.data()[[0, 0, 0]], 1.0);
    assert_eq!(volume.data()[[1, 1, 2]], 2.0);
    assert_eq!(volume.data()[[2, 0, 1]], 3.0);

    let output = tempfile::tempdir().unwrap();
    let path = output.path().join("volume.nii.gz");
    NiftiWriter.write(&volume, &path).unwrap();

    let mut bytes = Vec::new();
    GzDecoder::new(fs::File::open(&path).unwrap())
        .read_to_end(&mut bytes)
        .unwrap();
    assert_eq!(bytes.len(), 352 + 18 * 4);
    let mut dim = [0i16; 4];
    LittleEndian::read_i16_into(&bytes[40..48], &mut dim);
    assert_eq!(dim, [3, 3, 2, 3]);
    // depth is flipped on export, so the file starts with the highest slice
    assert_eq!(LittleEndian::read_f32(&bytes[352..356]), 3.0);
}

#[test]
fn test_header_only_load_keeps_ordering() {
    let input = tempfile::tempdir().unwrap();
    write_slice(&input.path().join("1.dcm"), "1.2.3", 2.5, 1);
    write_slice(&input.path().join("2.dcm"), "1.2.3", -2.5, 2);

    let series = SeriesLoader::load_from_directory(input.path(), ReadMode::HeaderOnly).unwrap();
    let keys: Vec<f64> = series.keys().map(|k| k.value()).collect();
    assert_eq!(keys, vec![-2.5, 2.5]);
}

#[test]
fn test_directory_without_dicom_is_empty_series() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("notes.txt"), "nothing here").unwrap();
    let result = SeriesLoader::load_from_directory(input.path(), ReadMode::Full);
    assert!(matches!(result, Err(LoadError::EmptySeries)));
}
