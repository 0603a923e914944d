//! Intensity normalization.
//!
//! Callers pass one user-facing integer in `INTENSITY_MIN..=INTENSITY_MAX`.
//! Each filter maps it onto its own parameter range with [`remap`].
//!
//! ```rust
//! use twinfx_ops::intensity::{remap, INTENSITY_MAX, INTENSITY_MIN};
//!
//! assert_eq!(remap(INTENSITY_MIN, 1.0, 3.0), 1.0);
//! assert_eq!(remap(INTENSITY_MAX, 1.0, 3.0), 3.0);
//! assert_eq!(remap(10, 0.0, 255.0), 127.5);
//! ```

/// Lowest accepted intensity.
pub const INTENSITY_MIN: i32 = 0;

/// Highest accepted intensity.
pub const INTENSITY_MAX: i32 = 20;

/// Intensity used when a caller does not pick one.
pub const DEFAULT_INTENSITY: i32 = 5;

/// Clamps `intensity` into the accepted domain.
#[inline]
pub fn clamp(intensity: i32) -> i32 {
    intensity.clamp(INTENSITY_MIN, INTENSITY_MAX)
}

/// Linearly maps `intensity` from the input domain onto `[lo, hi]`, clamped.
#[inline]
pub fn remap(intensity: i32, lo: f32, hi: f32) -> f32 {
    let span = (INTENSITY_MAX - INTENSITY_MIN) as f32;
    let t = (clamp(intensity) - INTENSITY_MIN) as f32 / span;
    (lo + t * (hi - lo)).clamp(lo.min(hi), lo.max(hi))
}

/// Window radius for filters whose intensity is a pixel radius.
#[inline]
pub fn radius(intensity: i32) -> usize {
    clamp(intensity) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_remap_endpoints() {
        assert_relative_eq!(remap(0, 0.5, 3.5), 0.5);
        assert_relative_eq!(remap(20, 0.5, 3.5), 3.5);
        assert_relative_eq!(remap(5, 1.0, 41.0), 11.0);
    }

    #[test]
    fn test_remap_clamps_out_of_domain() {
        assert_relative_eq!(remap(-7, 1.0, 3.0), 1.0);
        assert_relative_eq!(remap(99, 1.0, 3.0), 3.0);
    }

    #[test]
    fn test_remap_inverted_interval() {
        assert_relative_eq!(remap(0, 10.0, 0.0), 10.0);
        assert_relative_eq!(remap(20, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_radius() {
        assert_eq!(radius(3), 3);
        assert_eq!(radius(-1), 0);
        assert_eq!(radius(50), 20);
    }
}
