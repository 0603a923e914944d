//! Shared plumbing for every filter.

use crate::{OpsError, OpsResult};
use std::ops::Range;
use twinfx_core::{ColorSpace, OutputBuffer, PixelBuffer, Region, HSV_VALUE};

/// Rejects mismatched buffers and regions that leave the image.
pub(crate) fn validate(src: &PixelBuffer, region: Region, dst: &OutputBuffer) -> OpsResult<()> {
    if !dst.matches(src) {
        return Err(OpsError::SizeMismatch(format!(
            "source {}x{} {} vs output {}x{} {}",
            src.width(),
            src.height(),
            src.color_space(),
            dst.width(),
            dst.height(),
            dst.color_space()
        )));
    }
    if !region.fits(src.width(), src.height()) {
        return Err(OpsError::RegionOutOfBounds(format!(
            "{region} outside {}x{}",
            src.width(),
            src.height()
        )));
    }
    Ok(())
}

/// Channels a tonal filter rewrites. HSV filters only touch Value.
#[inline]
pub(crate) fn tonal_channels(color_space: ColorSpace) -> Range<usize> {
    match color_space {
        ColorSpace::Rgb => 0..3,
        ColorSpace::Hsv => HSV_VALUE..HSV_VALUE + 1,
        ColorSpace::Grayscale => 0..1,
    }
}

/// Copies the channels a tonal filter leaves alone (Hue and Saturation).
pub(crate) fn copy_passthrough(src: &PixelBuffer, region: Region, dst: &OutputBuffer) {
    if src.color_space() != ColorSpace::Hsv {
        return;
    }
    for y in region.y_begin..region.y_end {
        for x in region.x_begin..region.x_end {
            for c in 0..HSV_VALUE {
                dst.store(x, y, c, src.sample(x, y, c));
            }
        }
    }
}

/// Rounds and clamps a filter result into a sample.
#[inline]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Integer division rounded to nearest.
#[inline]
pub(crate) fn div_round(sum: u64, divisor: u64) -> u8 {
    ((sum + divisor / 2) / divisor).min(255) as u8
}

/// `[begin, end)` of a `2r + 1` window centered on `at`, clipped to `len`.
#[inline]
pub(crate) fn clip(at: usize, radius: usize, len: usize) -> Range<usize> {
    at.saturating_sub(radius)..(at + radius + 1).min(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip() {
        assert_eq!(clip(0, 2, 10), 0..3);
        assert_eq!(clip(5, 2, 10), 3..8);
        assert_eq!(clip(9, 2, 10), 7..10);
        assert_eq!(clip(1, 0, 10), 1..2);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(4, 3), 1);
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(254.6), 255);
        assert_eq!(clamp_u8(300.0), 255);
    }

    #[test]
    fn test_validate() {
        let src = PixelBuffer::new(4, 4, ColorSpace::Rgb).unwrap();
        let dst = OutputBuffer::like(&src);
        assert!(validate(&src, Region::full(4, 4), &dst).is_ok());
        assert!(matches!(
            validate(&src, Region::new(0, 5, 0, 4), &dst),
            Err(OpsError::RegionOutOfBounds(_))
        ));
        let gray = OutputBuffer::new(4, 4, ColorSpace::Grayscale).unwrap();
        assert!(matches!(
            validate(&src, Region::full(4, 4), &gray),
            Err(OpsError::SizeMismatch(_))
        ));
    }
}
