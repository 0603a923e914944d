//! Neighborhood smoothing filters.
//!
//! - [`blur`] - Unweighted mean
//! - [`median`] - Rank filter
//! - [`gaussian`] - Separable Gaussian convolution
//!
//! Every filter reads the source outside its region (up to the window
//! radius) but writes only inside it, so any split of the image into regions
//! produces the same pixels as a single whole-image pass.

use crate::intensity::{radius, remap};
use crate::mask::{gaussian_taps, EdgeMode};
use crate::support::{clamp_u8, clip, copy_passthrough, div_round, tonal_channels, validate};
use crate::{FilterOptions, OpsResult};
use tracing::trace;
use twinfx_core::{OutputBuffer, PixelBuffer, Region};

/// Sums channel `c` over the clipped `(2r+1)^2` window of every pixel in
/// `region`, calling `emit(x, y, sum, divisor)`.
///
/// Column sums are rebuilt per row and the horizontal window slides over
/// them, so each pixel costs `O(r)`.
pub(crate) fn box_sums<F>(
    src: &PixelBuffer,
    region: Region,
    channel: usize,
    r: usize,
    edge: EdgeMode,
    mut emit: F,
) where
    F: FnMut(usize, usize, u64, u64),
{
    let (w, h) = (src.width(), src.height());
    let full_area = ((2 * r + 1) * (2 * r + 1)) as u64;
    let cols = region.x_begin.saturating_sub(r)..(region.x_end + r).min(w);
    let mut column = vec![0u64; cols.len()];

    for y in region.y_begin..region.y_end {
        let rows = clip(y, r, h);
        for (slot, x) in column.iter_mut().zip(cols.clone()) {
            *slot = rows.clone().map(|yy| src.sample(x, yy, channel) as u64).sum();
        }
        for x in region.x_begin..region.x_end {
            let span = clip(x, r, w);
            let sum: u64 = column[span.start - cols.start..span.end - cols.start].iter().sum();
            let divisor = match edge {
                EdgeMode::FixedArea => full_area,
                EdgeMode::Renormalize => (rows.len() * span.len()) as u64,
            };
            emit(x, y, sum, divisor);
        }
    }
}

/// Mean over a `(2r+1) x (2r+1)` window, `r = intensity`.
pub fn blur(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    opts: &FilterOptions,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let r = radius(intensity);
    trace!(%region, radius = r, edge = %opts.edge_mode, "blur");

    copy_passthrough(src, region, dst);
    for c in tonal_channels(src.color_space()) {
        box_sums(src, region, c, r, opts.edge_mode, |x, y, sum, divisor| {
            dst.store(x, y, c, div_round(sum, divisor));
        });
    }
    Ok(())
}

/// Middle value of the in-bounds samples of a `(2r+1) x (2r+1)` window,
/// `r = intensity`.
///
/// Uses a 256-bin histogram that slides along each row.
pub fn median(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let r = radius(intensity);
    trace!(%region, radius = r, "median");

    let (w, h) = (src.width(), src.height());
    copy_passthrough(src, region, dst);

    for c in tonal_channels(src.color_space()) {
        for y in region.y_begin..region.y_end {
            let rows = clip(y, r, h);
            let mut hist = [0u32; 256];
            let mut count = 0u32;
            let column = |x: usize, hist: &mut [u32; 256], add: bool| {
                for yy in rows.clone() {
                    let v = src.sample(x, yy, c) as usize;
                    if add {
                        hist[v] += 1;
                    } else {
                        hist[v] -= 1;
                    }
                }
            };

            let first = clip(region.x_begin, r, w);
            let (mut lo, mut hi) = (first.start, first.start);
            for x in region.x_begin..region.x_end {
                let span = clip(x, r, w);
                while hi < span.end {
                    column(hi, &mut hist, true);
                    count += rows.len() as u32;
                    hi += 1;
                }
                while lo < span.start {
                    column(lo, &mut hist, false);
                    count -= rows.len() as u32;
                    lo += 1;
                }
                dst.store(x, y, c, histogram_rank(&hist, count / 2));
            }
        }
    }
    Ok(())
}

/// Value at 0-based position `rank` of the sorted histogram contents.
fn histogram_rank(hist: &[u32; 256], rank: u32) -> u8 {
    let mut seen = 0u32;
    for (value, &n) in hist.iter().enumerate() {
        seen += n;
        if seen > rank {
            return value as u8;
        }
    }
    255
}

/// Aperture (taps per side, odd) for a gaussian intensity.
pub fn gaussian_size(intensity: i32) -> usize {
    let size = remap(intensity, 1.0, 40.0).round() as usize;
    if size % 2 == 0 { size + 1 } else { size }
}

/// Normalized Gaussian convolution; aperture from [`gaussian_size`].
///
/// The 2D mask is separable, so rows are filtered first into a scratch band
/// covering the region plus its vertical apron, then columns.
pub fn gaussian(
    src: &PixelBuffer,
    region: Region,
    intensity: i32,
    opts: &FilterOptions,
    dst: &OutputBuffer,
) -> OpsResult<()> {
    validate(src, region, dst)?;
    let taps = gaussian_taps(gaussian_size(intensity));
    let r = taps.len() / 2;
    trace!(%region, taps = taps.len(), edge = %opts.edge_mode, "gaussian");

    if region.is_empty() {
        return Ok(());
    }
    let (w, h) = (src.width(), src.height());
    let band = region.y_begin.saturating_sub(r)..(region.y_end + r).min(h);
    let cols = region.width();
    let mut scratch = vec![0f32; band.len() * cols];

    let tap_sum = |span: std::ops::Range<usize>, center: usize| -> f32 {
        span.map(|i| taps[i + r - center]).sum()
    };

    copy_passthrough(src, region, dst);
    for c in tonal_channels(src.color_space()) {
        for (row, yy) in band.clone().enumerate() {
            for x in region.x_begin..region.x_end {
                let mut acc = 0f32;
                for xx in clip(x, r, w) {
                    acc += taps[xx + r - x] * src.sample(xx, yy, c) as f32;
                }
                scratch[row * cols + (x - region.x_begin)] = acc;
            }
        }

        for y in region.y_begin..region.y_end {
            let rows = clip(y, r, h);
            let row_weight = tap_sum(rows.clone(), y);
            for x in region.x_begin..region.x_end {
                let mut acc = 0f32;
                for yy in rows.clone() {
                    let at = (yy - band.start) * cols + (x - region.x_begin);
                    acc += taps[yy + r - y] * scratch[at];
                }
                let value = match opts.edge_mode {
                    EdgeMode::FixedArea => acc,
                    EdgeMode::Renormalize => acc / (row_weight * tap_sum(clip(x, r, w), x)),
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

    fn run<F>(src: &PixelBuffer, region: Region, f: F) -> PixelBuffer
    where
        F: FnOnce(&PixelBuffer, Region, &OutputBuffer) -> OpsResult<()>,
    {
        let dst = OutputBuffer::like(src);
        f(src, region, &dst).unwrap();
        dst.snapshot()
    }

    fn noise(w: usize, h: usize, cs: ColorSpace) -> PixelBuffer {
        let mut state = 0x2545_f491u32;
        PixelBuffer::from_fn(w, h, cs, |_, _, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .unwrap()
    }

    fn fixed() -> FilterOptions {
        FilterOptions::default()
    }

    fn renorm() -> FilterOptions {
        FilterOptions {
            edge_mode: EdgeMode::Renormalize,
        }
    }

    #[test]
    fn test_uniform_interior_preserved() {
        let src = PixelBuffer::filled(24, 24, ColorSpace::Rgb, &[90, 140, 210]).unwrap();
        let full = src.bounds();
        let r = 3;
        let interior = |img: &PixelBuffer, margin: usize| {
            for y in margin..24 - margin {
                for x in margin..24 - margin {
                    assert_eq!(img.pixel(x, y), &[90, 140, 210], "at ({x},{y})");
                }
            }
        };
        interior(&run(&src, full, |s, g, d| blur(s, g, r as i32, &fixed(), d)), r);
        interior(&run(&src, full, |s, g, d| median(s, g, r as i32, d)), 0);
        let k = gaussian_size(3) / 2;
        interior(&run(&src, full, |s, g, d| gaussian(s, g, 3, &fixed(), d)), k);
    }

    #[test]
    fn test_renormalize_preserves_uniform_everywhere() {
        let src = PixelBuffer::filled(9, 7, ColorSpace::Grayscale, &[200]).unwrap();
        let full = src.bounds();
        let b = run(&src, full, |s, g, d| blur(s, g, 4, &renorm(), d));
        assert!(b.data().iter().all(|&v| v == 200));
        let g = run(&src, full, |s, g, d| gaussian(s, g, 8, &renorm(), d));
        assert!(g.data().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_fixed_area_darkens_corners() {
        let src = PixelBuffer::filled(9, 9, ColorSpace::Grayscale, &[180]).unwrap();
        let b = run(&src, src.bounds(), |s, g, d| blur(s, g, 1, &fixed(), d));
        // corner sees 4 of 9 samples
        assert_eq!(b.sample(0, 0, 0), 80);
        assert_eq!(b.sample(4, 4, 0), 180);
    }

    #[test]
    fn test_intensity_zero_is_identity() {
        let src = noise(11, 6, ColorSpace::Rgb);
        let full = src.bounds();
        assert_eq!(run(&src, full, |s, g, d| blur(s, g, 0, &fixed(), d)), src);
        assert_eq!(run(&src, full, |s, g, d| median(s, g, 0, d)), src);
        assert_eq!(run(&src, full, |s, g, d| gaussian(s, g, 0, &fixed(), d)), src);
    }

    #[test]
    fn test_median_removes_spike() {
        let mut src = PixelBuffer::filled(5, 5, ColorSpace::Grayscale, &[50]).unwrap();
        src.set_pixel(2, 2, &[255]);
        let out = run(&src, src.bounds(), |s, g, d| median(s, g, 1, d));
        assert_eq!(out.sample(2, 2, 0), 50);
    }

    #[test]
    fn test_median_matches_sorting() {
        let src = noise(13, 9, ColorSpace::Grayscale);
        let r = 2;
        let out = run(&src, src.bounds(), |s, g, d| median(s, g, r as i32, d));
        for y in 0..9 {
            for x in 0..13 {
                let mut window = Vec::new();
                for yy in clip(y, r, 9) {
                    for xx in clip(x, r, 13) {
                        window.push(src.sample(xx, yy, 0));
                    }
                }
                window.sort_unstable();
                assert_eq!(out.sample(x, y, 0), window[window.len() / 2]);
            }
        }
    }

    #[test]
    fn test_hsv_only_value_changes() {
        let src = noise(8, 8, ColorSpace::Hsv);
        let out = run(&src, src.bounds(), |s, g, d| blur(s, g, 2, &fixed(), d));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(&out.pixel(x, y)[..2], &src.pixel(x, y)[..2]);
            }
        }
    }

    #[test]
    fn test_split_regions_match_whole_image() {
        let src = noise(17, 12, ColorSpace::Rgb);
        let stripes = twinfx_core::plan(17, 12, 5).unwrap();
        type Op = fn(&PixelBuffer, Region, &OutputBuffer) -> OpsResult<()>;
        let ops: [Op; 3] = [
            |s, g, d| blur(s, g, 3, &FilterOptions::default(), d),
            |s, g, d| median(s, g, 2, d),
            |s, g, d| gaussian(s, g, 9, &FilterOptions::default(), d),
        ];
        for op in ops {
            let whole = run(&src, src.bounds(), op);
            let dst = OutputBuffer::like(&src);
            for region in &stripes {
                op(&src, *region, &dst).unwrap();
            }
            assert_eq!(dst.snapshot(), whole);
        }
    }

    #[test]
    fn test_gaussian_size() {
        assert_eq!(gaussian_size(0), 1);
        assert_eq!(gaussian_size(20), 41);
        assert_eq!(gaussian_size(5) % 2, 1);
    }
}
