//! Writing assembled volumes to disk.
//!
//! The core hands a [`Volume`] to a [`VolumeWriter`]; any axis reordering or
//! coordinate convention of the target format is the writer's business.

use crate::volume::Volume;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use flate2::{Compression, write::GzEncoder};
use ndarray::s;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Volume of shape {0:?} does not fit a NIfTI-1 header")]
    TooLarge((usize, usize, usize)),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for an assembled volume.
pub trait VolumeWriter {
    fn write(&self, volume: &Volume, path: &Path) -> Result<(), ExportError>;
}

const HEADER_SIZE: usize = 348;
/// Header plus the 4-byte extension flag.
const VOX_OFFSET: f32 = 352.0;
const DT_FLOAT32: i16 = 16;
const NIFTI_UNITS_MM: u8 = 2;
const NIFTI_XFORM_SCANNER_ANAT: i16 = 1;

/// Single-file NIfTI-1 writer, float32 samples.
///
/// Paths ending in `.gz` are gzip compressed. The depth and row axes are
/// flipped on the way out and the voxel grid is placed at the origin with an
/// LPS to RAS affine, so x runs along columns, y along rows and z through
/// the slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiWriter;

impl NiftiWriter {
    /// Builds the 348-byte header for `volume`.
    pub fn header(volume: &Volume) -> Result<[u8; HEADER_SIZE], ExportError> {
        let (depth, rows, columns) = volume.dim();
        let dim_of = |n: usize| i16::try_from(n).map_err(|_| ExportError::TooLarge(volume.dim()));
        let (nx, ny, nz) = (dim_of(columns)?, dim_of(rows)?, dim_of(depth)?);
        let (row_spacing, column_spacing, slice_spacing) = volume.spacing();
        let (sx, sy, sz) = (column_spacing as f32, row_spacing as f32, slice_spacing as f32);
        let (ox, oy, oz) = volume.origin();

        let mut header = [0u8; HEADER_SIZE];
        LittleEndian::write_i32(&mut header[0..4], HEADER_SIZE as i32);
        LittleEndian::write_i16_into(&[3, nx, ny, nz, 1, 1, 1, 1], &mut header[40..56]);
        LittleEndian::write_i16(&mut header[70..72], DT_FLOAT32);
        LittleEndian::write_i16(&mut header[72..74], 32);
        LittleEndian::write_f32_into(&[1.0, sx, sy, sz, 1.0, 1.0, 1.0, 1.0], &mut header[76..108]);
        LittleEndian::write_f32(&mut header[108..112], VOX_OFFSET);
        LittleEndian::write_f32(&mut header[112..116], 1.0);
        header[123] = NIFTI_UNITS_MM;

        let descrip = b"dicom-stack";
        header[148..148 + descrip.len()].copy_from_slice(descrip);

        LittleEndian::write_i16(&mut header[252..254], NIFTI_XFORM_SCANNER_ANAT);
        LittleEndian::write_i16(&mut header[254..256], NIFTI_XFORM_SCANNER_ANAT);
        // quatern_b, c, d: 180 degrees about z, i.e. x and y negated
        LittleEndian::write_f32_into(&[0.0, 0.0, 1.0], &mut header[256..268]);
        let (ox, oy, oz) = (-(ox as f32), -(oy as f32), oz as f32);
        LittleEndian::write_f32_into(&[ox, oy, oz], &mut header[268..280]);
        LittleEndian::write_f32_into(&[-sx, 0.0, 0.0, ox], &mut header[280..296]);
        LittleEndian::write_f32_into(&[0.0, -sy, 0.0, oy], &mut header[296..312]);
        LittleEndian::write_f32_into(&[0.0, 0.0, sz, oz], &mut header[312..328]);

        header[344..348].copy_from_slice(b"n+1\0");
        Ok(header)
    }

    /// Writes header, empty extension flag and samples to `out`.
    pub fn write_to<W: Write>(volume: &Volume, mut out: W) -> Result<W, io::Error> {
        let header = Self::header(volume).map_err(io::Error::other)?;
        out.write_all(&header)?;
        out.write_all(&[0u8; 4])?;

        // NIfTI stores x fastest: iterate z, y, x over the flipped view
        let flipped = volume.data().slice(s![..;-1, ..;-1, ..]);
        for &value in flipped.iter() {
            out.write_f32::<LittleEndian>(value)?;
        }
        out.flush()?;
        Ok(out)
    }
}

impl VolumeWriter for NiftiWriter {
    fn write(&self, volume: &Volume, path: &Path) -> Result<(), ExportError> {
        // validate before touching the file
        Self::header(volume)?;

        let io_error = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = BufWriter::new(File::create(path).map_err(io_error)?);

        let gzipped = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        if gzipped {
            let encoder = Self::write_to(volume, GzEncoder::new(file, Compression::default()))
                .map_err(io_error)?;
            encoder.finish().and_then(|mut file| file.flush()).map_err(io_error)
        } else {
            Self::write_to(volume, file).map(drop).map_err(io_error)
        }
    }
}
