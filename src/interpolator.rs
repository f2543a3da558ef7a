use ndarray::ArrayView2;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Size of a plane resampled so that both axes share the finer of the
    /// two spacings.
    ///
    /// `dim` and `spacing` are (vertical, horizontal).
    pub(crate) fn get_isotropic_dimensions(
        dim: (usize, usize),
        spacing: (f64, f64),
    ) -> (u32, u32) {
        let (v_spacing, h_spacing) = spacing;
        let inv_min_spacing = 1.0 / v_spacing.min(h_spacing);

        let height = (dim.0 as f64 * v_spacing * inv_min_spacing).round() as u32;
        let width = (dim.1 as f64 * h_spacing * inv_min_spacing).round() as u32;

        (height.max(1), width.max(1))
    }

    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<f32>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = slice[[y0, x0]];
        let v01 = slice[[y0, x1]];
        let v10 = slice[[y1, x0]];
        let v11 = slice[[y1, x1]];

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }
}
