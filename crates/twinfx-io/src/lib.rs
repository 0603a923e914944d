//! # twinfx-io
//!
//! Image codec for twinfx.
//!
//! Decodes JPEG, PNG, BMP and TIFF into working [`PixelBuffer`]s in RGB, HSV
//! or grayscale, and encodes them back.
//!
//! # Example
//!
//! ```rust,ignore
//! use twinfx_core::ColorSpace;
//!
//! let image = twinfx_io::read_file("input.jpg", ColorSpace::Hsv)?;
//! twinfx_io::write_file("output.png", &image)?;
//! ```

#![warn(missing_docs)]

mod codec;
pub mod convert;
mod error;

pub use codec::ImageRsCodec;
pub use error::{IoError, IoResult};

use std::fs;
use std::path::Path;
use tracing::info;
use twinfx_core::{ColorSpace, ContainerFormat, PixelBuffer};

/// Container implied by a path's extension.
pub fn format_for_path(path: &Path) -> IoResult<ContainerFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    ContainerFormat::from_extension(ext)
        .ok_or_else(|| IoError::UnsupportedFormat(path.display().to_string()))
}

/// Reads and decodes an image file.
pub fn read_file<P: AsRef<Path>>(path: P, color_space: ColorSpace) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let image = ImageRsCodec::new().decode_bytes(&bytes, color_space)?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "read");
    Ok(image)
}

/// Encodes `image` in the container named by the path's extension and writes it.
pub fn write_file<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    let bytes = ImageRsCodec::new().encode_bytes(image, format)?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), %format, "wrote");
    Ok(())
}
