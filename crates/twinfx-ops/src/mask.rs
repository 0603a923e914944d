//! Convolution masks and edge handling.
//!
//! # Masks
//!
//! - [`Mask::laplacian90`] - 4-neighbor Laplacian
//! - [`Mask::laplacian45`] - 8-neighbor Laplacian
//! - [`gaussian_taps`] - 1D Gaussian, applied separably
//!
//! # Edges
//!
//! Samples outside the image are skipped, never wrapped or reflected.
//! [`EdgeMode`] decides what the weighted sum is divided by.
//!
//! ```rust
//! use twinfx_ops::mask::{gaussian_taps, Mask};
//!
//! assert_eq!(Mask::laplacian90().at(0, 0), -4.0);
//! let taps = gaussian_taps(5);
//! assert!((taps.iter().sum::<f32>() - 1.0).abs() < 1e-5);
//! ```

use crate::{OpsError, OpsResult};
use std::fmt;
use std::str::FromStr;

/// Divisor policy for windows that hang over the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeMode {
    /// Divide by the full mask weight; border pixels come out darker.
    #[default]
    FixedArea,
    /// Divide by the weight of the samples actually inside the image.
    Renormalize,
}

impl EdgeMode {
    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FixedArea => "fixed",
            Self::Renormalize => "renormalize",
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeMode {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed_area" | "zero" => Ok(Self::FixedArea),
            "renormalize" | "renorm" | "normalize" => Ok(Self::Renormalize),
            other => Err(OpsError::InvalidParameter(format!("unknown edge mode '{other}'"))),
        }
    }
}

/// Square, odd-sized, centered matrix of weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    weights: Vec<f32>,
    size: usize,
}

impl Mask {
    /// 4-neighbor Laplacian (edges at 90 degrees).
    #[rustfmt::skip]
    pub fn laplacian90() -> Self {
        Self {
            weights: vec![
                0.0,  1.0, 0.0,
                1.0, -4.0, 1.0,
                0.0,  1.0, 0.0,
            ],
            size: 3,
        }
    }

    /// 8-neighbor Laplacian (adds the 45 degree diagonals).
    #[rustfmt::skip]
    pub fn laplacian45() -> Self {
        Self {
            weights: vec![
                1.0,  1.0, 1.0,
                1.0, -8.0, 1.0,
                1.0,  1.0, 1.0,
            ],
            size: 3,
        }
    }

    /// Half the side length.
    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weight at offset `(dx, dy)` from the center.
    #[inline]
    pub fn at(&self, dx: isize, dy: isize) -> f32 {
        let r = self.radius() as isize;
        self.weights[((dy + r) as usize) * self.size + (dx + r) as usize]
    }
}

/// Normalized 1D Gaussian taps; the 2D mask is their outer product.
///
/// Sigma follows the usual derivation from the aperture:
/// `0.3 * ((n - 1) / 2 - 1) + 0.8`.
pub fn gaussian_taps(size: usize) -> Vec<f32> {
    let size = if size % 2 == 0 { size + 1 } else { size.max(1) };
    let half = (size / 2) as isize;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let two_sigma2 = 2.0 * sigma * sigma;

    let mut taps: Vec<f32> = (-half..=half)
        .map(|d| (-((d * d) as f32) / two_sigma2).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}
