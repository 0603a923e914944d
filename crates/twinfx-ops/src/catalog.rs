//! The closed filter catalog and its dispatch table.
//!
//! ```rust
//! use twinfx_ops::Filter;
//!
//! let f: Filter = "Laplacian45-Border".parse().unwrap();
//! assert_eq!(f, Filter::Laplacian45Border);
//! assert_eq!(f.name(), "laplacian45_border");
//! assert!("SHARPNESS".parse::<Filter>().is_ok());
//! assert!("unknown".parse::<Filter>().is_err());
//! ```

use crate::mask::EdgeMode;
use crate::point::{grayscale, negative, saturation, thresholding};
use crate::sharpen::{laplacian, sharpen, LaplacianOutput, Neighbors};
use crate::smooth::{blur, gaussian, median};
use crate::{OpsError, OpsResult};
use std::fmt;
use std::str::FromStr;
use twinfx_core::{OutputBuffer, PixelBuffer, Region};

/// Options shared by every filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    /// Border divisor policy for weighted windows.
    pub edge_mode: EdgeMode,
}

/// Every supported filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Inverted samples.
    Negative,
    /// Binary split.
    Thresholding,
    /// Box mean.
    Blur,
    /// Unsharp mask.
    Sharpen,
    /// Rank filter.
    Median,
    /// Color removal.
    Grayscale,
    /// Gaussian blur.
    Gaussian,
    /// 4-neighbor edge map.
    Laplacian90Border,
    /// 8-neighbor edge map.
    Laplacian45Border,
    /// 4-neighbor Laplacian sharpening.
    Laplacian90Sharpen,
    /// 8-neighbor Laplacian sharpening.
    Laplacian45Sharpen,
    /// Saturation gain.
    Saturation,
}

impl Filter {
    /// Catalog order.
    pub const ALL: [Filter; 12] = [
        Filter::Negative,
        Filter::Thresholding,
        Filter::Blur,
        Filter::Sharpen,
        Filter::Median,
        Filter::Grayscale,
        Filter::Gaussian,
        Filter::Laplacian90Border,
        Filter::Laplacian45Border,
        Filter::Laplacian90Sharpen,
        Filter::Laplacian45Sharpen,
        Filter::Saturation,
    ];

    /// Canonical snake_case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Thresholding => "thresholding",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Median => "median",
            Self::Grayscale => "grayscale",
            Self::Gaussian => "gaussian",
            Self::Laplacian90Border => "laplacian90_border",
            Self::Laplacian45Border => "laplacian45_border",
            Self::Laplacian90Sharpen => "laplacian90_sharpen",
            Self::Laplacian45Sharpen => "laplacian45_sharpen",
            Self::Saturation => "saturation",
        }
    }

    /// False for filters that ignore the intensity argument.
    pub const fn uses_intensity(self) -> bool {
        !matches!(self, Self::Negative | Self::Grayscale)
    }

    /// One-line description for listings.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Negative => "invert samples (HSV: rotate hue, invert value)",
            Self::Thresholding => "black/white split at intensity mapped to 0..255",
            Self::Blur => "box mean, radius = intensity",
            Self::Sharpen => "unsharp mask over an 11x11 mean, gain 1..3",
            Self::Median => "median of the window, radius = intensity",
            Self::Grayscale => "luma (RGB) or zero saturation (HSV)",
            Self::Gaussian => "gaussian blur, aperture 1..41",
            Self::Laplacian90Border => "4-neighbor edge map, gain 0.5..3.5",
            Self::Laplacian45Border => "8-neighbor edge map, gain 0.5..3.5",
            Self::Laplacian90Sharpen => "4-neighbor Laplacian sharpening, gain 0.5..3.5",
            Self::Laplacian45Sharpen => "8-neighbor Laplacian sharpening, gain 0.5..3.5",
            Self::Saturation => "scale saturation, gain 0..2",
        }
    }

    /// Runs the filter over `region` of `src` into the same region of `dst`.
    ///
    /// Samples outside `region` are never written.
    pub fn apply(
        self,
        src: &PixelBuffer,
        region: Region,
        intensity: i32,
        opts: &FilterOptions,
        dst: &OutputBuffer,
    ) -> OpsResult<()> {
        use LaplacianOutput::{Border, Sharpen};
        use Neighbors::{Eight, Four};

        match self {
            Self::Negative => negative(src, region, dst),
            Self::Thresholding => thresholding(src, region, intensity, dst),
            Self::Blur => blur(src, region, intensity, opts, dst),
            Self::Sharpen => sharpen(src, region, intensity, opts, dst),
            Self::Median => median(src, region, intensity, dst),
            Self::Grayscale => grayscale(src, region, dst),
            Self::Gaussian => gaussian(src, region, intensity, opts, dst),
            Self::Laplacian90Border => laplacian(src, region, intensity, Four, Border, opts, dst),
            Self::Laplacian45Border => laplacian(src, region, intensity, Eight, Border, opts, dst),
            Self::Laplacian90Sharpen => laplacian(src, region, intensity, Four, Sharpen, opts, dst),
            Self::Laplacian45Sharpen => {
                laplacian(src, region, intensity, Eight, Sharpen, opts, dst)
            }
            Self::Saturation => saturation(src, region, intensity, dst),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        if let Some(f) = Self::ALL.iter().find(|f| f.name() == key) {
            return Ok(*f);
        }
        match key.as_str() {
            "invert" => Ok(Self::Negative),
            "threshold" => Ok(Self::Thresholding),
            "sharpness" => Ok(Self::Sharpen),
            "gray" | "gray_scale" | "grey" => Ok(Self::Grayscale),
            "gauss" => Ok(Self::Gaussian),
            _ => Err(OpsError::UnknownFilter(s.to_string())),
        }
    }
}
