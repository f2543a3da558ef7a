use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use dicom::object::{DefaultDicomObject, OpenFileOptions};
use dicom::pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption};
use dicom_dictionary_std::{tags, uids};
use ndarray::{Array2, s};
use thiserror::Error;

use crate::enums::ReadMode;
use crate::metadata::{SeriesIdentity, get_as_fixed_list, get_as_float};

/// Slice Location used when the attribute is missing or unreadable.
pub const DEFAULT_SLICE_LOCATION: f64 = -1.0;

/// Transfer syntaxes whose pixel data is stored uncompressed.
#[allow(deprecated)]
const NATIVE_TRANSFER_SYNTAXES: [&str; 4] = [
    uids::IMPLICIT_VR_LITTLE_ENDIAN,
    uids::EXPLICIT_VR_LITTLE_ENDIAN,
    uids::EXPLICIT_VR_BIG_ENDIAN,
    uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
];

/// A single file that could not be turned into a [`SliceRecord`].
#[derive(Debug, Error)]
#[error("could not read {}: {source}", path.display())]
pub struct SliceError {
    pub path: PathBuf,
    #[source]
    pub source: dicom::object::ReadError,
}

/// Why the pixel frame of a slice could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("compressed transfer syntax {0} is not supported")]
    Unsupported(String),

    #[error("{0}")]
    Failed(String),
}

/// Through-plane position of a slice, totally ordered.
#[derive(Debug, Clone, Copy)]
pub struct SliceKey(f64);

impl SliceKey {
    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 are the same position
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SliceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SliceKey {}

impl PartialOrd for SliceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SliceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One DICOM file together with the attributes needed to place it in a
/// volume.
#[derive(Debug, Clone)]
pub struct SliceRecord {
    pub path: Option<PathBuf>,
    pub identity: SeriesIdentity,
    /// Image Position (Patient), exactly three possibly empty components.
    pub image_position: Vec<String>,
    pub slice_location: f64,
    /// Pixel Spacing as (row spacing, column spacing), if both parse.
    pub pixel_spacing: Option<(f64, f64)>,
    /// Slice Thickness, or `None` when absent.
    pub slice_thickness: Option<f64>,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
    pub rows: usize,
    pub columns: usize,
    object: DefaultDicomObject,
}

impl SliceRecord {
    /// Opens the file at `path`, stopping before Pixel Data in
    /// [`ReadMode::HeaderOnly`].
    pub fn open(path: impl AsRef<Path>, read_mode: ReadMode) -> Result<Self, SliceError> {
        let path = path.as_ref();
        let options = match read_mode {
            ReadMode::HeaderOnly => OpenFileOptions::new().read_until(tags::PIXEL_DATA),
            ReadMode::Full => OpenFileOptions::new(),
        };
        let object = options.open_file(path).map_err(|source| SliceError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut record = Self::from_object(object);
        record.path = Some(path.to_path_buf());
        Ok(record)
    }

    pub fn from_object(object: DefaultDicomObject) -> Self {
        let pixel_spacing = get_as_fixed_list(&object, tags::PIXEL_SPACING, 2);
        let pixel_spacing = match (pixel_spacing[0].parse(), pixel_spacing[1].parse()) {
            (Ok(row), Ok(column)) => Some((row, column)),
            _ => None,
        };
        let slice_thickness = Some(get_as_float(&object, tags::SLICE_THICKNESS, f64::NAN))
            .filter(|thickness| !thickness.is_nan());

        Self {
            path: None,
            identity: SeriesIdentity::from_object(&object),
            image_position: get_as_fixed_list(&object, tags::IMAGE_POSITION_PATIENT, 3),
            slice_location: get_as_float(&object, tags::SLICE_LOCATION, DEFAULT_SLICE_LOCATION),
            pixel_spacing,
            slice_thickness,
            rescale_slope: get_as_float(&object, tags::RESCALE_SLOPE, 1.0),
            rescale_intercept: get_as_float(&object, tags::RESCALE_INTERCEPT, 0.0),
            rows: get_as_float(&object, tags::ROWS, 0.0) as usize,
            columns: get_as_float(&object, tags::COLUMNS, 0.0) as usize,
            object,
        }
    }

    /// Position used to order this slice within its series.
    ///
    /// The z component of Image Position (Patient) wins when it is present
    /// and differs from Slice Location; otherwise Slice Location is used.
    pub fn ordering_key(&self) -> SliceKey {
        let position_z = self.image_position[2].parse::<f64>().ok();
        match position_z {
            Some(z) if z != self.slice_location => SliceKey::new(z),
            _ => SliceKey::new(self.slice_location),
        }
    }

    /// Human-readable name for diagnostics.
    pub fn source_name(&self) -> String {
        self.path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<in-memory object>".to_string())
    }

    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    pub fn transfer_syntax(&self) -> &str {
        self.object.meta().transfer_syntax()
    }

    /// Decodes the first frame as raw stored values.
    ///
    /// No modality or VOI LUT is applied; rescaling is up to the caller.
    pub fn decode_frame(&self) -> Result<Array2<f32>, DecodeError> {
        let transfer_syntax = self.transfer_syntax();
        if !NATIVE_TRANSFER_SYNTAXES.contains(&transfer_syntax) {
            return Err(DecodeError::Unsupported(transfer_syntax.to_string()));
        }

        let pixel_data = self
            .object
            .decode_pixel_data()
            .map_err(|e| DecodeError::Failed(e.to_string()))?;
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
            .map_err(|e| DecodeError::Failed(e.to_string()))
    }
}
