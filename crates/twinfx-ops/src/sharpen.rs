//! Edge filters: unsharp masking and Laplacian edge extraction.

use crate::intensity::remap;
use crate::mask::{EdgeMode, Mask};
use crate::smooth::box_sums;
use crate::support::{clamp_u8, clip, copy_passthrough, tonal_channels, validate};
use crate::{FilterOptions, OpsResult};
use tracing::trace;
use twinfx_core::{OutputBuffer, PixelBuffer, Region};

/// Radius of the low-pass used by [`sharpen`] (an 11x11 mean).
pub const UNSHARP_RADIUS: usize = 5;

/// Unsharp mask: `in + k * (in - mean)`, `k` remapped to `[1, 3]`.
pub fn sharpen(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    opts: &FilterOptions,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let gain = remap(intensity, 1.0, 3.0);
    trace!(%region, gain, edge = %opts.edge_mode, "sharpen");

    copy_passthrough(src, region, dst);
    for c in tonal_channels(src.color_space()) {
        box_sums(src, region, c, UNSHARP_RADIUS, opts.edge_mode, |x, y, sum, divisor| {
            let v = src.sample(x, y, c) as f32;
            let low = sum as f32 / divisor as f32;
            dst.store(x, y, c, clamp_u8(v + gain * (v - low)));
        });
    }
    Ok(())
}

/// Which neighbors the Laplacian sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbors {
    /// Up, down, left, right.
    Four,
    /// Adds the diagonals.
    Eight,
}

impl Neighbors {
    /// The 3x3 mask for this neighborhood.
    pub fn mask(self) -> Mask {
        match self {
            Self::Four => Mask::laplacian90(),
            Self::Eight => Mask::laplacian45(),
        }
    }
}

/// What to do with the Laplacian response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaplacianOutput {
    /// Edge map: `k * |L|`.
    Border,
    /// Sharpened image: `in - k * L`.
    Sharpen,
}

/// 3x3 Laplacian with gain `k` remapped to `[0.5, 3.5]`.
///
/// Out-of-bounds neighbors are skipped. Under [`EdgeMode::Renormalize`] the
/// center weight becomes minus the sum of the in-bounds neighbor weights, so a
/// flat border still answers zero.
pub fn laplacian(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    neighbors: Neighbors,
    output: LaplacianOutput,
    opts: &FilterOptions,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let gain = remap(intensity, 0.5, 3.5);
    let mask = neighbors.mask();
    let r = mask.radius();
    trace!(%region, gain, ?neighbors, ?output, "laplacian");

    let (w, h) = (src.width(), src.height());
    copy_passthrough(src, region, dst);
    for c in tonal_channels(src.color_space()) {
        for y in region.y_begin..region.y_end {
            for x in region.x_begin..region.x_end {
                let center = src.sample(x, y, c) as f32;
                let mut acc = 0f32;
                let mut neighbor_weight = 0f32;
                for yy in clip(y, r, h) {
                    for xx in clip(x, r, w) {
                        if xx == x && yy == y {
                            continue;
                        }
                        let k = mask.at(xx as isize - x as isize, yy as isize - y as isize);
                        acc += k * src.sample(xx, yy, c) as f32;
                        neighbor_weight += k;
                    }
                }
                let center_weight = match opts.edge_mode {
                    EdgeMode::FixedArea => mask.at(0, 0),
                    EdgeMode::Renormalize => -neighbor_weight,
                };
                let response = acc + center_weight * center;
                let value = match output {
                    LaplacianOutput::Border => gain * response.abs(),
                    LaplacianOutput::Sharpen => center - gain * response,
                };
                dst.store(x, y, c, clamp_u8(value));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinfx_core::ColorSpace;

    fn run<F>(src: &PixelBuffer, f: F) -> PixelBuffer
    where
        F: FnOnce(&PixelBuffer, Region, &OutputBuffer) -> OpsResult<()>,
    {
        let dst = OutputBuffer::like(src);
        f(src, src.bounds(), &dst).unwrap();
        dst.snapshot()
    }

    fn renorm() -> FilterOptions {
        FilterOptions {
            edge_mode: EdgeMode::Renormalize,
        }
    }

    /// Left half dark, right half bright.
    fn step() -> PixelBuffer {
        PixelBuffer::from_fn(12, 12, ColorSpace::Grayscale, |x, _, _| if x < 6 { 60 } else { 180 })
            .unwrap()
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let src = PixelBuffer::filled(8, 8, ColorSpace::Grayscale, &[120]).unwrap();
        for n in [Neighbors::Four, Neighbors::Eight] {
            let edges = run(&src, |s, r, d| {
                laplacian(s, r, 10, n, LaplacianOutput::Border, &renorm(), d)
            });
            assert!(edges.data().iter().all(|&v| v == 0));
            let sharp = run(&src, |s, r, d| {
                laplacian(s, r, 10, n, LaplacianOutput::Sharpen, &renorm(), d)
            });
            assert_eq!(sharp, src);
        }
    }

    #[test]
    fn test_fixed_area_border_sees_missing_neighbors() {
        let src = PixelBuffer::filled(5, 5, ColorSpace::Grayscale, &[100]).unwrap();
        let opts = FilterOptions::default();
        let edges = run(&src, |s, r, d| {
            laplacian(s, r, 0, Neighbors::Four, LaplacianOutput::Border, &opts, d)
        });
        // corner: 2 neighbors * 100 - 4 * 100 = -200; gain 0.5
        assert_eq!(edges.sample(0, 0, 0), 100);
        assert_eq!(edges.sample(2, 2, 0), 0);
    }

    #[test]
    fn test_border_marks_step() {
        let src = step();
        let edges = run(&src, |s, r, d| {
            laplacian(s, r, 0, Neighbors::Four, LaplacianOutput::Border, &renorm(), d)
        });
        // |L| = 120 next to the step, gain 0.5
        assert_eq!(edges.sample(5, 6, 0), 60);
        assert_eq!(edges.sample(6, 6, 0), 60);
        assert_eq!(edges.sample(2, 6, 0), 0);
        assert_eq!(edges.sample(9, 6, 0), 0);
    }

    #[test]
    fn test_laplacian_sharpen_raises_contrast() {
        let src = step();
        let out = run(&src, |s, r, d| {
            laplacian(s, r, 0, Neighbors::Eight, LaplacianOutput::Sharpen, &renorm(), d)
        });
        assert!(out.sample(5, 6, 0) < 60);
        assert!(out.sample(6, 6, 0) > 180);
    }

    #[test]
    fn test_unsharp_overshoots_step() {
        let src = step();
        let out = run(&src, |s, r, d| sharpen(s, r, 10, &renorm(), d));
        assert!(out.sample(5, 6, 0) < 60);
        assert!(out.sample(6, 6, 0) > 180);
        assert_eq!(out.sample(0, 6, 0), 60);
    }

    #[test]
    fn test_unsharp_flat_interior_unchanged() {
        let src = PixelBuffer::filled(16, 16, ColorSpace::Rgb, &[10, 128, 240]).unwrap();
        let out = run(&src, |s, r, d| sharpen(s, r, 20, &FilterOptions::default(), d));
        assert_eq!(out.pixel(8, 8), &[10, 128, 240]);
    }

    #[test]
    fn test_hsv_hue_saturation_untouched() {
        let src =
            PixelBuffer::from_fn(6, 6, ColorSpace::Hsv, |x, y, c| (x * 40 + y * 7 + c * 30) as u8)
                .unwrap();
        let out = run(&src, |s, r, d| {
            laplacian(s, r, 15, Neighbors::Eight, LaplacianOutput::Sharpen, &renorm(), d)
        });
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(&out.pixel(x, y)[..2], &src.pixel(x, y)[..2]);
            }
        }
    }
}
