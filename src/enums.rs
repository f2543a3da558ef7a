/// Anatomical plane used when extracting a 2D image from a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Axial,
    Coronal,
    Sagittal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Resample the plane so that both image axes have the same physical
    /// pixel size.
    Bilinear,
    #[default]
    None,
}

/// How much of each file the series loader reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Stop parsing before the Pixel Data element. Enough for ordering and
    /// reporting, not for assembly.
    HeaderOnly,
    #[default]
    Full,
}

/// Source of the through-plane component of the volume spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacingStrategy {
    /// Slice Thickness of the reference slice.
    #[default]
    Declared,
    /// Most frequent gap between consecutive ordering keys. Handles
    /// overlapping reconstructions where thickness != center-to-center
    /// distance.
    Robust,
}
