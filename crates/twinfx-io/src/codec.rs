//! [`ImageCodec`] on top of the `image` crate.

use crate::convert::{hsv_buffer_to_rgb, rgb_buffer_to_hsv, rgb_buffer_to_luma};
use crate::{IoError, IoResult};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::{debug, trace};
use twinfx_core::{ColorSpace, ContainerFormat, ImageCodec, PixelBuffer};

/// Decodes JPEG/PNG/BMP/TIFF into working pixels and encodes them back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageRsCodec {
    /// Creates the codec.
    pub fn new() -> Self {
        Self
    }

    /// Decodes container bytes; the container is sniffed from the data.
    pub fn decode_bytes(&self, bytes: &[u8], color_space: ColorSpace) -> IoResult<PixelBuffer> {
        trace!(bytes = bytes.len(), %color_space, "decode");
        let img = image::load_from_memory(bytes).map_err(|e| IoError::DecodeError(e.to_string()))?;
        let rgb = img.to_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        debug!(width = w, height = h, "decoded container");

        let data = match color_space {
            ColorSpace::Rgb => rgb.into_raw(),
            ColorSpace::Hsv => rgb_buffer_to_hsv(rgb.as_raw()),
            ColorSpace::Grayscale => rgb_buffer_to_luma(rgb.as_raw()),
        };
        Ok(PixelBuffer::from_raw(w, h, color_space, data)?)
    }

    /// Encodes `image` as `format`, converting HSV back to RGB first.
    pub fn encode_bytes(&self, image: &PixelBuffer, format: ContainerFormat) -> IoResult<Vec<u8>> {
        trace!(width = image.width(), height = image.height(), %format, "encode");
        let (w, h) = (image.width() as u32, image.height() as u32);
        let too_large =
            || IoError::EncodeError(format!("{w}x{h} buffer does not fit its dimensions"));

        let dynamic = match image.color_space() {
            ColorSpace::Rgb => DynamicImage::ImageRgb8(
                RgbImage::from_raw(w, h, image.data().to_vec()).ok_or_else(too_large)?,
            ),
            ColorSpace::Hsv => DynamicImage::ImageRgb8(
                RgbImage::from_raw(w, h, hsv_buffer_to_rgb(image.data())).ok_or_else(too_large)?,
            ),
            ColorSpace::Grayscale => DynamicImage::ImageLuma8(
                GrayImage::from_raw(w, h, image.data().to_vec()).ok_or_else(too_large)?,
            ),
        };

        let mut out = Cursor::new(Vec::new());
        dynamic
            .write_to(&mut out, image_format(format))
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        Ok(out.into_inner())
    }
}

fn image_format(format: ContainerFormat) -> ImageFormat {
    match format {
        ContainerFormat::Jpeg => ImageFormat::Jpeg,
        ContainerFormat::Png => ImageFormat::Png,
        ContainerFormat::Bmp => ImageFormat::Bmp,
        ContainerFormat::Tiff => ImageFormat::Tiff,
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8], color_space: ColorSpace) -> twinfx_core::Result<PixelBuffer> {
        Ok(self.decode_bytes(bytes, color_space)?)
    }

    fn encode(&self, image: &PixelBuffer, format: ContainerFormat) -> twinfx_core::Result<Vec<u8>> {
        Ok(self.encode_bytes(image, format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        PixelBuffer::from_fn(9, 5, ColorSpace::Rgb, |x, y, c| (x * 25 + y * 40 + c * 70) as u8)
            .unwrap()
    }

    #[test]
    fn test_png_is_lossless() {
        let codec = ImageRsCodec::new();
        let src = sample();
        let bytes = codec.encode_bytes(&src, ContainerFormat::Png).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(codec.decode_bytes(&bytes, ColorSpace::Rgb).unwrap(), src);
    }

    #[test]
    fn test_every_container_decodes() {
        let codec = ImageRsCodec::new();
        let src = sample();
        for format in ContainerFormat::ALL {
            let bytes = codec.encode_bytes(&src, format).unwrap();
            let back = codec.decode_bytes(&bytes, ColorSpace::Rgb).unwrap();
            assert_eq!((back.width(), back.height()), (9, 5), "{format}");
        }
    }

    #[test]
    fn test_decode_color_spaces() {
        let codec = ImageRsCodec::new();
        let red = PixelBuffer::filled(2, 2, ColorSpace::Rgb, &[255, 0, 0]).unwrap();
        let bytes = codec.encode_bytes(&red, ContainerFormat::Png).unwrap();

        let hsv = codec.decode_bytes(&bytes, ColorSpace::Hsv).unwrap();
        assert_eq!(hsv.color_space(), ColorSpace::Hsv);
        assert_eq!(hsv.pixel(0, 0), &[0, 255, 255]);

        let gray = codec.decode_bytes(&bytes, ColorSpace::Grayscale).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.sample(1, 1, 0), 76);
    }

    #[test]
    fn test_hsv_encodes_as_rgb() {
        let codec = ImageRsCodec::new();
        let hsv = PixelBuffer::filled(3, 3, ColorSpace::Hsv, &[120, 255, 255]).unwrap();
        let bytes = codec.encode_bytes(&hsv, ContainerFormat::Png).unwrap();
        let rgb = codec.decode_bytes(&bytes, ColorSpace::Rgb).unwrap();
        assert_eq!(rgb.pixel(2, 2), &[0, 0, 255]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let codec = ImageRsCodec::new();
        let err = codec.decode(b"definitely not an image", ColorSpace::Rgb).unwrap_err();
        assert!(err.is_codec_error());
    }
}
