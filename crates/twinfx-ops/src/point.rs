//! Per-pixel filters: the output pixel depends only on the input pixel.
//!
//! - [`negative`] - Invert samples (HSV: rotate hue, invert value)
//! - [`thresholding`] - Binary black/white split
//! - [`grayscale`] - Remove color
//! - [`saturation`] - Scale color away from or toward gray

use crate::intensity::remap;
use crate::support::{clamp_u8, validate};
use crate::OpsResult;
use tracing::trace;
use twinfx_core::{
    ColorSpace, OutputBuffer, PixelBuffer, Region, HSV_HUE, HSV_SATURATION, HSV_VALUE, HUE_STEPS,
};

/// BT.601 luma weights for `R`, `G`, `B`.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

#[inline]
fn luma(px: &[u8]) -> f32 {
    LUMA_WEIGHTS[0] * px[0] as f32 + LUMA_WEIGHTS[1] * px[1] as f32 + LUMA_WEIGHTS[2] * px[2] as f32
}

fn map_pixels<F>(src: &PixelBuffer, region: Region, dst: &OutputBuffer, mut f: F)
where
    F: FnMut(&[u8], &mut [u8; 3]),
{
    let channels = src.channels();
    let mut out = [0u8; 3];
    for y in region.y_begin..region.y_end {
        for x in region.x_begin..region.x_end {
            f(src.pixel(x, y), &mut out);
            dst.store_pixel(x, y, &out[..channels]);
        }
    }
}

/// Inverts every sample: `255 - v`.
///
/// In HSV the hue is rotated by half a turn instead of inverted; saturation
/// is kept.
pub fn negative(src: &PixelBuffer, region: Region, dst: &OutputBuffer) -> OpsResult<()> {
    validate(src, region, dst)?;
    trace!(%region, color_space = %src.color_space(), "negative");

    match src.color_space() {
        ColorSpace::Hsv => map_pixels(src, region, dst, |px, out| {
            let half_turn = HUE_STEPS / 2;
            out[HSV_HUE] = ((px[HSV_HUE] as u16 + half_turn) % HUE_STEPS) as u8;
            out[HSV_SATURATION] = px[HSV_SATURATION];
            out[HSV_VALUE] = 255 - px[HSV_VALUE];
        }),
        ColorSpace::Rgb | ColorSpace::Grayscale => map_pixels(src, region, dst, |px, out| {
            for (o, &v) in out.iter_mut().zip(px) {
                *o = 255 - v;
            }
        }),
    }
    Ok(())
}

/// Splits pixels into pure black and pure white.
///
/// The threshold is the intensity remapped to `[0, 255]`; a pixel turns white
/// when its brightness (RGB channel mean, HSV Value, or gray) is strictly
/// above it. HSV output keeps the hue and drops saturation.
pub fn thresholding(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let threshold = remap(intensity, 0.0, 255.0).round() as u32;
    trace!(%region, threshold, "thresholding");

    let level = |white: bool| if white { 255 } else { 0 };
    match src.color_space() {
        ColorSpace::Rgb => map_pixels(src, region, dst, |px, out| {
            // mean > t  <=>  sum > 3t
            let sum: u32 = px.iter().map(|&v| v as u32).sum();
            out.fill(level(sum > 3 * threshold));
        }),
        ColorSpace::Hsv => map_pixels(src, region, dst, |px, out| {
            out[HSV_HUE] = px[HSV_HUE];
            out[HSV_SATURATION] = 0;
            out[HSV_VALUE] = level(px[HSV_VALUE] as u32 > threshold);
        }),
        ColorSpace::Grayscale => map_pixels(src, region, dst, |px, out| {
            out[0] = level(px[0] as u32 > threshold);
        }),
    }
    Ok(())
}

/// Removes color.
///
/// RGB: luma `0.299 R + 0.587 G + 0.114 B` replicated to every channel.
/// HSV: saturation set to zero. Grayscale: copied.
pub fn grayscale(src: &PixelBuffer, region: Region, dst: &OutputBuffer) -> OpsResult<()> {
    validate(src, region, dst)?;
    trace!(%region, "grayscale");

    match src.color_space() {
        ColorSpace::Rgb => map_pixels(src, region, dst, |px, out| {
            out.fill(clamp_u8(luma(px)));
        }),
        ColorSpace::Hsv => map_pixels(src, region, dst, |px, out| {
            out[HSV_HUE] = px[HSV_HUE];
            out[HSV_SATURATION] = 0;
            out[HSV_VALUE] = px[HSV_VALUE];
        }),
        ColorSpace::Grayscale => map_pixels(src, region, dst, |px, out| out[0] = px[0]),
    }
    Ok(())
}

/// Scales saturation by a gain remapped to `[0, 2]`.
///
/// HSV multiplies S. RGB pushes each channel away from (gain > 1) or toward
/// (gain < 1) the pixel's luma. Grayscale has no color and is copied.
pub fn saturation(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let gain = remap(intensity, 0.0, 2.0);
    trace!(%region, gain, "saturation");

    match src.color_space() {
        ColorSpace::Rgb => map_pixels(src, region, dst, |px, out| {
            let y = luma(px);
            for (o, &v) in out.iter_mut().zip(px) {
                *o = clamp_u8(y + gain * (v as f32 - y));
            }
        }),
        ColorSpace::Hsv => map_pixels(src, region, dst, |px, out| {
            out[HSV_HUE] = px[HSV_HUE];
            out[HSV_SATURATION] = clamp_u8(px[HSV_SATURATION] as f32 * gain);
            out[HSV_VALUE] = px[HSV_VALUE];
        }),
        ColorSpace::Grayscale => map_pixels(src, region, dst, |px, out| out[0] = px[0]),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<F>(src: &PixelBuffer, f: F) -> PixelBuffer
    where
        F: FnOnce(&PixelBuffer, Region, &OutputBuffer) -> OpsResult<()>,
    {
        let dst = OutputBuffer::like(src);
        f(src, src.bounds(), &dst).unwrap();
        dst.snapshot()
    }

    fn gradient(cs: ColorSpace) -> PixelBuffer {
        PixelBuffer::from_fn(7, 5, cs, |x, y, c| ((x * 31 + y * 17 + c * 53) % 256) as u8).unwrap()
    }

    #[test]
    fn test_negative_is_involution() {
        for cs in [ColorSpace::Rgb, ColorSpace::Grayscale] {
            let src = gradient(cs);
            let once = run(&src, negative);
            assert!(once.data().iter().zip(src.data()).all(|(&n, &v)| n == 255 - v));
            let twice = run(&once, negative);
            assert_eq!(twice, src);
        }
    }

    #[test]
    fn test_negative_hsv_rotates_hue() {
        let src = PixelBuffer::filled(2, 2, ColorSpace::Hsv, &[120, 200, 40]).unwrap();
        let out = run(&src, negative);
        assert_eq!(out.pixel(1, 1), &[30, 200, 215]);
    }

    #[test]
    fn test_threshold_extremes() {
        let src = PixelBuffer::from_fn(6, 6, ColorSpace::Rgb, |x, y, c| {
            1 + ((x + y + c) * 40 % 254) as u8
        })
        .unwrap();
        let white = run(&src, |s, r, d| thresholding(s, r, 0, d));
        assert!(white.data().iter().all(|&v| v == 255));
        let black = run(&src, |s, r, d| thresholding(s, r, 20, d));
        assert!(black.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_threshold_uses_rgb_mean() {
        // mean 100 vs threshold 127.5 -> 128
        let src = PixelBuffer::filled(1, 1, ColorSpace::Rgb, &[250, 25, 25]).unwrap();
        let out = run(&src, |s, r, d| thresholding(s, r, 10, d));
        assert_eq!(out.pixel(0, 0), &[0, 0, 0]);
    }

    #[test]
    fn test_threshold_hsv_value_only() {
        let src = PixelBuffer::filled(1, 1, ColorSpace::Hsv, &[90, 180, 200]).unwrap();
        let out = run(&src, |s, r, d| thresholding(s, r, 10, d));
        assert_eq!(out.pixel(0, 0), &[90, 0, 255]);
    }

    #[test]
    fn test_grayscale_luma() {
        let src = PixelBuffer::filled(2, 1, ColorSpace::Rgb, &[255, 0, 0]).unwrap();
        let out = run(&src, grayscale);
        assert_eq!(out.pixel(0, 0), &[76, 76, 76]);

        let hsv = PixelBuffer::filled(2, 1, ColorSpace::Hsv, &[10, 99, 77]).unwrap();
        assert_eq!(run(&hsv, grayscale).pixel(1, 0), &[10, 0, 77]);
    }

    #[test]
    fn test_saturation_identity_at_unit_gain() {
        let src = gradient(ColorSpace::Rgb);
        let out = run(&src, |s, r, d| saturation(s, r, 10, d));
        for (a, b) in out.data().iter().zip(src.data()) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
        let gray = run(&src, |s, r, d| saturation(s, r, 0, d));
        for y in 0..5 {
            for x in 0..7 {
                let px = gray.pixel(x, y);
                assert!(px[0] == px[1] && px[1] == px[2]);
            }
        }
    }

    #[test]
    fn test_region_only_written() {
        let src = PixelBuffer::filled(4, 4, ColorSpace::Grayscale, &[10]).unwrap();
        let dst = OutputBuffer::like(&src);
        negative(&src, Region::new(0, 4, 1, 2), &dst).unwrap();
        let out = dst.snapshot();
        for y in 0..4 {
            let expected = if y == 1 { 245 } else { 0 };
            assert!((0..4).all(|x| out.sample(x, y, 0) == expected));
        }
    }
}
