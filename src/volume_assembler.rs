use crate::{
    enums::SpacingStrategy,
    series_loader::SeriesCollection,
    slice::{DecodeError, SliceKey, SliceRecord},
    volume::Volume,
};

use log::{debug, info, warn};
use ndarray::{Array3, ArrayViewMut2, Axis, Zip};
use rayon::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

/// Slice gaps are compared at this resolution (samples per mm).
const GAP_RESOLUTION: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Cannot assemble an empty series")]
    EmptySeries,

    #[error("Reference slice has no usable grid ({rows} rows, {columns} columns)")]
    InvalidGeometry { rows: usize, columns: usize },

    #[error("Invalid spacing: {0}")]
    InvalidSpacing(String),

    #[error("Slice {ordinal} uses compressed transfer syntax {transfer_syntax}, which is not supported")]
    UnsupportedEncoding {
        ordinal: usize,
        transfer_syntax: String,
    },

    #[error("Unexpected error while extracting pixel data of slice {ordinal}: {reason}")]
    UnexpectedDecode { ordinal: usize, reason: String },
}

/// Stacks a [`SeriesCollection`] into a [`Volume`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeAssembler {
    spacing_strategy: SpacingStrategy,
}

impl VolumeAssembler {
    pub fn new(spacing_strategy: SpacingStrategy) -> Self {
        Self { spacing_strategy }
    }

    /// Assemble the slices of `series` in ascending key order
    ///
    /// Grid size, pixel spacing, slice thickness and the rescale slope and
    /// intercept are taken from the lowest-key slice. The other slices are
    /// assumed to share its grid.
    ///
    /// # Errors
    ///
    /// Returns error if the reference slice has no usable geometry or any
    /// slice cannot be decoded. Decode errors name the 1-based position of
    /// the slice in stacking order.
    pub fn assemble(&self, series: SeriesCollection) -> Result<Volume, AssemblyError> {
        let keys: Vec<f64> = series.keys().map(SliceKey::value).collect();
        let slices: Vec<SliceRecord> = series.into_iter().map(|(_, slice)| slice).collect();
        let reference = slices.first().ok_or(AssemblyError::EmptySeries)?;

        let (rows, columns) = (reference.rows, reference.columns);
        if rows == 0 || columns == 0 {
            return Err(AssemblyError::InvalidGeometry { rows, columns });
        }
        let spacing = self.spacing(reference, &keys)?;
        let (slope, intercept) = (reference.rescale_slope, reference.rescale_intercept);
        debug!(
            "Grid {}x{}x{}, rescale {} * v + {}",
            slices.len(),
            rows,
            columns,
            slope,
            intercept
        );

        let mut data = Array3::<f32>::zeros((slices.len(), rows, columns));
        let outcomes: Vec<Result<(), AssemblyError>> = data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(slices.par_iter())
            .enumerate()
            .map(|(index, (plane, slice))| {
                Self::write_plane(index + 1, slice, plane, (rows, columns), slope, intercept)
            })
            .collect();
        outcomes.into_iter().collect::<Result<(), _>>()?;

        info!(
            "Assembled volume {:?} with spacing {:?}",
            data.dim(),
            spacing
        );
        Ok(Volume::new(data, spacing))
    }

    fn write_plane(
        ordinal: usize,
        slice: &SliceRecord,
        plane: ArrayViewMut2<'_, f32>,
        grid: (usize, usize),
        slope: f64,
        intercept: f64,
    ) -> Result<(), AssemblyError> {
        let frame = slice.decode_frame().map_err(|e| match e {
            DecodeError::Unsupported(transfer_syntax) => AssemblyError::UnsupportedEncoding {
                ordinal,
                transfer_syntax,
            },
            DecodeError::Failed(reason) => AssemblyError::UnexpectedDecode { ordinal, reason },
        })?;

        if frame.dim() != grid {
            return Err(AssemblyError::UnexpectedDecode {
                ordinal,
                reason: format!(
                    "frame is {:?} but the series grid is {:?}",
                    frame.dim(),
                    grid
                ),
            });
        }

        Zip::from(plane)
            .and(&frame)
            .for_each(|out, &raw| *out = (f64::from(raw) * slope + intercept) as f32);
        Ok(())
    }

    fn spacing(
        &self,
        reference: &SliceRecord,
        keys: &[f64],
    ) -> Result<(f64, f64, f64), AssemblyError> {
        let (row, column) = reference
            .pixel_spacing
            .filter(|&(row, column)| is_valid_spacing(row) && is_valid_spacing(column))
            .ok_or_else(|| {
                AssemblyError::InvalidSpacing(format!(
                    "Pixel Spacing of {} is {:?}",
                    reference.source_name(),
                    reference.pixel_spacing
                ))
            })?;

        let declared = || {
            reference
                .slice_thickness
                .filter(|&thickness| is_valid_spacing(thickness))
                .ok_or_else(|| {
                    AssemblyError::InvalidSpacing(format!(
                        "Slice Thickness of {} is {:?}",
                        reference.source_name(),
                        reference.slice_thickness
                    ))
                })
        };

        let through_plane = match self.spacing_strategy {
            SpacingStrategy::Declared => declared()?,
            SpacingStrategy::Robust => match robust_slice_spacing(keys) {
                Some(gap) if is_valid_spacing(gap) => gap,
                _ => {
                    warn!(
                        "Cannot estimate slice spacing from {} slices, using Slice Thickness",
                        keys.len()
                    );
                    declared()?
                }
            },
        };

        Ok((row, column, through_plane))
    }
}

fn is_valid_spacing(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Most frequent gap between consecutive sorted ordering keys.
///
/// Gaps are rounded to 1 µm before counting; ties go to the smallest gap.
/// Returns `None` for fewer than two keys.
pub fn robust_slice_spacing(sorted_keys: &[f64]) -> Option<f64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for pair in sorted_keys.windows(2) {
        let gap = ((pair[1] - pair[0]) * GAP_RESOLUTION).round() as i64;
        *counts.entry(gap).or_default() += 1;
    }

    let mut modal: Option<(i64, usize)> = None;
    for (&gap, &count) in &counts {
        if modal.is_none_or(|(_, best)| count > best) {
            modal = Some((gap, count));
        }
    }
    modal.map(|(gap, _)| gap as f64 / GAP_RESOLUTION)
}
