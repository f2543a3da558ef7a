use crate::enums::Orientation;

use ndarray::{Array3, ArrayView2, s};

/// Dense scalar volume assembled from a slice series.
///
/// Axis 0 runs through the slices, axes 1 and 2 are the rows and columns of
/// each slice. The volume is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<f32>,
    spacing: (f64, f64, f64),
    origin: (f64, f64, f64),
}

impl Volume {
    /// `spacing` is (row spacing, column spacing, slice spacing) in mm.
    pub(crate) fn new(data: Array3<f32>, spacing: (f64, f64, f64)) -> Self {
        Self {
            data,
            spacing,
            origin: (0.0, 0.0, 0.0),
        }
    }

    /// Get the dimensions of the volume (depth, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Physical distance between samples: (row spacing, column spacing,
    /// slice spacing), all strictly positive.
    pub fn spacing(&self) -> (f64, f64, f64) {
        self.spacing
    }

    pub fn origin(&self) -> (f64, f64, f64) {
        self.origin
    }

    pub fn into_parts(self) -> (Array3<f32>, (f64, f64, f64)) {
        (self.data, self.spacing)
    }

    /// Smallest and largest sample, or `None` for an empty volume.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Number of planes available along `orientation`.
    pub fn extent(&self, orientation: Orientation) -> usize {
        let (depth, rows, columns) = self.dim();
        match orientation {
            Orientation::Axial => depth,
            Orientation::Coronal => rows,
            Orientation::Sagittal => columns,
        }
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ArrayView2<'_, f32>> {
        if index >= self.extent(orientation) {
            return None;
        }
        let slice = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(slice)
    }
}
