//! 8-bit color conversions between interleaved RGB, HSV and luma.
//!
//! HSV uses the 8-bit convention common to vision libraries: hue in half
//! degrees `[0, 180)`, saturation and value in `[0, 255]`.
//!
//! All conversions run over pixels in parallel with rayon.

use rayon::prelude::*;

/// BT.601 luma of one RGB pixel, rounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// One RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };
    let h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };
    // 359.x degrees rounds to 180 half-degrees, which wraps to 0
    let h = ((h / 2.0).round() as u16 % 180) as u8;
    [h, s.round() as u8, v as u8]
}

/// One 8-bit HSV pixel to RGB.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> [u8; 3] {
    let s = s as f32 / 255.0;
    let v = v as f32;
    if s == 0.0 {
        let v = v.round() as u8;
        return [v, v, v];
    }
    let h = (h as f32 * 2.0) % 360.0 / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let q8 = |x: f32| x.round().clamp(0.0, 255.0) as u8;
    [q8(r), q8(g), q8(b)]
}

/// Interleaved RGB to interleaved HSV.
pub fn rgb_buffer_to_hsv(rgb: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; rgb.len()];
    out.par_chunks_exact_mut(3)
        .zip(rgb.par_chunks_exact(3))
        .for_each(|(dst, px)| dst.copy_from_slice(&rgb_to_hsv(px[0], px[1], px[2])));
    out
}

/// Interleaved HSV to interleaved RGB.
pub fn hsv_buffer_to_rgb(hsv: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; hsv.len()];
    out.par_chunks_exact_mut(3)
        .zip(hsv.par_chunks_exact(3))
        .for_each(|(dst, px)| dst.copy_from_slice(&hsv_to_rgb(px[0], px[1], px[2])));
    out
}

/// Interleaved RGB to one luma byte per pixel.
pub fn rgb_buffer_to_luma(rgb: &[u8]) -> Vec<u8> {
    rgb.par_chunks_exact(3)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(128, 128, 128), [0, 0, 128]);
    }

    #[test]
    fn test_hsv_back_to_rgb() {
        assert_eq!(hsv_to_rgb(0, 255, 255), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(60, 255, 255), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(120, 255, 255), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(90, 0, 77), [77, 77, 77]);
    }

    #[test]
    fn test_round_trip_error_is_small() {
        for r in (0..=255).step_by(17) {
            for g in (0..=255).step_by(15) {
                for b in (0..=255).step_by(51) {
                    let [h, s, v] = rgb_to_hsv(r as u8, g as u8, b as u8);
                    let back = hsv_to_rgb(h, s, v);
                    for (a, e) in back.iter().zip([r, g, b]) {
                        // hue is quantized to 2 degrees
                        assert!((*a as i32 - e).abs() <= 6, "{r},{g},{b} -> {back:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_buffers() {
        let rgb = [255, 0, 0, 0, 0, 255];
        assert_eq!(rgb_buffer_to_hsv(&rgb), vec![0, 255, 255, 120, 255, 255]);
        assert_eq!(hsv_buffer_to_rgb(&rgb_buffer_to_hsv(&rgb)), rgb.to_vec());
        assert_eq!(rgb_buffer_to_luma(&rgb), vec![76, 29]);
    }
}
