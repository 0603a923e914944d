//! Working color spaces.
//!
//! Pixels reach the core already converted by the codec collaborator into one
//! of three 8-bit layouts:
//!
//! | Space | Channels | Layout |
//! |---|---|---|
//! | [`ColorSpace::Rgb`] | 3 | `R G B` |
//! | [`ColorSpace::Hsv`] | 3 | `H S V`, hue on the half-degree scale `0..180` |
//! | [`ColorSpace::Grayscale`] | 1 | `Y` |
//!
//! The background every output buffer starts from is all-zero bytes in
//! every space (black; for HSV `H=0, S=0, V=0`).

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Number of hue steps in the 8-bit HSV layout (one step = two degrees).
pub const HUE_STEPS: u16 = 180;

/// Channel index of Hue in an HSV pixel.
pub const HSV_HUE: usize = 0;
/// Channel index of Saturation in an HSV pixel.
pub const HSV_SATURATION: usize = 1;
/// Channel index of Value in an HSV pixel.
pub const HSV_VALUE: usize = 2;

/// Byte value output buffers are cleared to before a job runs.
pub const BACKGROUND: u8 = 0;

/// Channel layout and semantics of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Three independent color channels.
    #[default]
    Rgb,
    /// Hue / Saturation / Value.
    Hsv,
    /// Single luma channel.
    Grayscale,
}

impl ColorSpace {
    /// Every supported color space, in display order.
    pub const ALL: [ColorSpace; 3] = [ColorSpace::Rgb, ColorSpace::Hsv, ColorSpace::Grayscale];

    /// Number of interleaved channels per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgb | Self::Hsv => 3,
            Self::Grayscale => 1,
        }
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Hsv => "hsv",
            Self::Grayscale => "grayscale",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" | "color" => Ok(Self::Rgb),
            "hsv" => Ok(Self::Hsv),
            "gray" | "grey" | "grayscale" | "gray_scale" | "greyscale" => Ok(Self::Grayscale),
            other => Err(Error::unsupported_format(format!("color space '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(ColorSpace::Rgb.channels(), 3);
        assert_eq!(ColorSpace::Hsv.channels(), 3);
        assert_eq!(ColorSpace::Grayscale.channels(), 1);
    }

    #[test]
    fn test_parse() {
        assert_eq!("RGB".parse::<ColorSpace>().unwrap(), ColorSpace::Rgb);
        assert_eq!("gray_scale".parse::<ColorSpace>().unwrap(), ColorSpace::Grayscale);
        assert_eq!(" hsv ".parse::<ColorSpace>().unwrap(), ColorSpace::Hsv);
        assert!("cmyk".parse::<ColorSpace>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for cs in ColorSpace::ALL {
            assert_eq!(cs.to_string().parse::<ColorSpace>().unwrap(), cs);
        }
    }
}
