use crate::error::{CollagerError, CollagerResult};

pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Size, Vec2};

/// Target aspect ratio represented as a rational `num/den` (width over height).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AspectRatio {
    /// Width units, must be non-zero.
    pub num: u32,
    /// Height units, must be non-zero.
    pub den: u32,
}

impl AspectRatio {
    /// Create a validated ratio.
    pub fn new(num: u32, den: u32) -> CollagerResult<Self> {
        if num == 0 {
            return Err(CollagerError::validation("AspectRatio num must be > 0"));
        }
        if den == 0 {
            return Err(CollagerError::validation("AspectRatio den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Square 1:1 ratio.
    pub fn square() -> Self {
        Self { num: 1, den: 1 }
    }

    /// Convert to floating-point width/height.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::square()
    }
}

/// Grid axis: the column track list or the row track list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// Horizontal sequence of column widths.
    Columns,
    /// Vertical sequence of row heights.
    Rows,
}

/// Straight-alpha RGBA8 color.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub fn white() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }
    }

    /// Opaque color from RGB channels.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}
