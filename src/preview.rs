//! Static grayscale rendering of a single volume plane.

use crate::enums::{Interpolation, Orientation};
use crate::interpolator::Interpolator;
use crate::volume::Volume;

use image::{GrayImage, ImageBuffer};
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Plane {index} is outside the {orientation:?} extent of {extent}")]
    OutOfRange {
        index: usize,
        orientation: Orientation,
        extent: usize,
    },

    #[error("Rendered buffer does not fill a {width}x{height} image")]
    BufferSize { width: u32, height: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Intensity window mapped onto the 0..=255 display range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub center: f32,
    pub width: f32,
}

impl Window {
    pub fn new(center: f32, width: f32) -> Self {
        Self {
            center,
            width: width.max(f32::EPSILON),
        }
    }

    /// Window spanning `min..=max`.
    pub fn from_range(min: f32, max: f32) -> Self {
        Self::new((min + max) / 2.0, max - min)
    }

    /// Parses Window Center / Window Width strings, using the first value of
    /// each.
    pub fn parse(center: &str, width: &str) -> Option<Self> {
        let first = |s: &str| s.split('\\').next()?.trim().parse::<f32>().ok();
        let width = first(width).filter(|w| *w > 0.0)?;
        Some(Self::new(first(center)?, width))
    }

    #[inline]
    fn to_u8(self, value: f32) -> u8 {
        let low = self.center - self.width / 2.0;
        ((value - low) / self.width * 255.0).clamp(0.0, 255.0) as u8
    }
}

/// Physical (vertical, horizontal) spacing of a plane.
fn plane_spacing(volume: &Volume, orientation: Orientation) -> (f64, f64) {
    let (row, column, slice) = volume.spacing();
    match orientation {
        Orientation::Axial => (row, column),
        Orientation::Coronal => (slice, column),
        Orientation::Sagittal => (slice, row),
    }
}

/// Renders plane `index` along `orientation`.
///
/// Coronal and sagittal planes are flipped vertically so that the last slice
/// is at the top.
pub fn render_plane(
    volume: &Volume,
    index: usize,
    orientation: Orientation,
    interpolation: Interpolation,
    window: Window,
) -> Result<GrayImage, PreviewError> {
    let plane = volume
        .get_slice_from_axis(index, orientation)
        .ok_or(PreviewError::OutOfRange {
            index,
            orientation,
            extent: volume.extent(orientation),
        })?;
    let flip = !matches!(orientation, Orientation::Axial);
    let (height, width) = plane.dim();

    let (out_height, out_width) = match interpolation {
        Interpolation::None => (height as u32, width as u32),
        Interpolation::Bilinear => {
            Interpolator::get_isotropic_dimensions(plane.dim(), plane_spacing(volume, orientation))
        }
    };

    let pixels: Vec<u8> = (0..out_height)
        .into_par_iter()
        .flat_map_iter(|y| {
            let plane = &plane;
            (0..out_width).map(move |x| {
                let value = match interpolation {
                    Interpolation::None => plane[[y as usize, x as usize]],
                    Interpolation::Bilinear => sample(plane, y, x, out_height, out_width),
                };
                window.to_u8(value)
            })
        })
        .collect();

    let image: GrayImage =
        ImageBuffer::from_raw(out_width, out_height, pixels).ok_or(PreviewError::BufferSize {
            width: out_width,
            height: out_height,
        })?;
    Ok(if flip {
        image::imageops::flip_vertical(&image)
    } else {
        image
    })
}

fn sample(plane: &ArrayView2<'_, f32>, y: u32, x: u32, out_height: u32, out_width: u32) -> f32 {
    let (height, width) = plane.dim();

    // half-pixel centres, then back to source coordinates
    let src_y = (y as f32 + 0.5) / out_height as f32 * height as f32 - 0.5;
    let src_x = (x as f32 + 0.5) / out_width as f32 * width as f32 - 0.5;

    let src_y = src_y.clamp(0.0, (height - 1) as f32);
    let src_x = src_x.clamp(0.0, (width - 1) as f32);

    Interpolator::bilinear_interpolate(plane, src_y, src_x)
}

/// Saves the middle plane along `orientation` as an image at `path`.
///
/// The format follows the file extension.
pub fn save_center_plane(
    volume: &Volume,
    orientation: Orientation,
    interpolation: Interpolation,
    window: Window,
    path: impl AsRef<Path>,
) -> Result<(), PreviewError> {
    let index = volume.extent(orientation) / 2;
    render_plane(volume, index, orientation, interpolation, window)?.save(path)?;
    Ok(())
}
