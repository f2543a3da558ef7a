//! # dicom-stack
//!
//! This crate turns a directory of single-slice DICOM files into one
//! correctly ordered, physically scaled 3D volume and writes it as NIfTI.
//!
//! The pipeline has three stages:
//!  - [`SeriesLoader`] reads every file, checks that all slices belong to the
//!    same patient, study and series, and keys each slice by its position
//!    along the through-plane axis.
//!  - [`VolumeAssembler`] stacks the slices in ascending key order into an
//!    `Array3<f32>` of shape (depth, rows, columns), applying the rescale
//!    slope and intercept, and works out the voxel spacing.
//!  - A [`VolumeWriter`] such as [`NiftiWriter`] stores the result.
//!
//! Unreadable files are logged and skipped. Mixed series, compressed pixel
//! data and undecodable slices abort the run. Attribute lookups never fail;
//! see [`metadata`] for the defaults they fall back to.
//!
//! Diagnostics go through the [`log`] facade. The library never installs a
//! logger.
//!
//! # Examples
//!
//! ## Converting a directory
//!
//! ```no_run
//! # use dicom_stack::{NiftiWriter, ReadMode, SeriesLoader, SpacingStrategy, VolumeAssembler, VolumeWriter};
//! # use std::path::Path;
//! let series = SeriesLoader::load_from_directory("dicom", ReadMode::Full)
//!     .expect("should have loaded a series from directory");
//! let volume = VolumeAssembler::new(SpacingStrategy::Robust)
//!     .assemble(series)
//!     .expect("should have assembled the series");
//! NiftiWriter
//!     .write(&volume, Path::new("output.nii.gz"))
//!     .expect("should have written the volume");
//! ```

pub mod enums;
pub mod export;
mod interpolator;
pub mod metadata;
pub mod preview;
pub mod report;
pub mod series_loader;
pub mod slice;
pub mod volume;
pub mod volume_assembler;

#[cfg(test)]
mod testing;

pub use enums::{Interpolation, Orientation, ReadMode, SpacingStrategy};
pub use export::{ExportError, NiftiWriter, VolumeWriter};
pub use series_loader::{LoadError, SeriesCollection, SeriesLoader};
pub use slice::{SliceKey, SliceRecord};
pub use volume::Volume;
pub use volume_assembler::{AssemblyError, VolumeAssembler};
