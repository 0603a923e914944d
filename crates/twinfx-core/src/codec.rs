//! Codec collaborator interface.
//!
//! The core never touches container bytes itself. A codec implementation
//! (see `twinfx-io`) turns JPEG/PNG/BMP/TIFF bytes into a [`PixelBuffer`]
//! in the requested working [`ColorSpace`] and back.

use crate::{ColorSpace, Error, PixelBuffer, Result};
use std::fmt;
use std::str::FromStr;

/// Container formats an encoded image can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerFormat {
    /// JPEG (lossy).
    Jpeg,
    /// PNG (lossless).
    #[default]
    Png,
    /// Windows bitmap.
    Bmp,
    /// TIFF.
    Tiff,
}

impl ContainerFormat {
    /// Every supported container, in display order.
    pub const ALL: [ContainerFormat; 4] = [Self::Jpeg, Self::Png, Self::Bmp, Self::Tiff];

    /// Preferred file extension (without the dot).
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// MIME type for transports.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Looks a container up by file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s).ok_or_else(|| Error::unsupported_format(s.to_string()))
    }
}

/// Decodes container bytes into working pixels and encodes them back.
///
/// Color-space conversion is the codec's job: `decode` must return a buffer
/// tagged with exactly the requested `color_space`, and `encode` must accept
/// any working color space.
pub trait ImageCodec: Send + Sync {
    /// Decodes `bytes` into a buffer in `color_space`.
    fn decode(&self, bytes: &[u8], color_space: ColorSpace) -> Result<PixelBuffer>;

    /// Encodes `image` as a `format` container.
    fn encode(&self, image: &PixelBuffer, format: ContainerFormat) -> Result<Vec<u8>>;
}
