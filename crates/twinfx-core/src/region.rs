//! Regions and the stripe planner.
//!
//! A [`Region`] is a half-open rectangle `[x_begin, x_end) x [y_begin, y_end)`
//! of the pixel grid. [`plan`] splits an image into disjoint stripes, one per
//! parallel task.
//!
//! # Coordinate System
//!
//! ```text
//! (0,0) ────────► X (columns, width)
//!   │
//!   │   ┌──────────┐
//!   │   │  Region  │
//!   │   └──────────┘
//!   ▼
//!   Y (rows, height)
//! ```
//!
//! # Planning
//!
//! The planner cuts one axis into `n` shares that differ by at most one unit:
//! every share gets `length / n` units and the first `length % n` shares get
//! one extra. The other axis is left whole.
//!
//! ```rust
//! use twinfx_core::{plan_along, SplitAxis};
//!
//! // 6 rows into 4 stripes: 2, 2, 1, 1
//! let regions = plan_along(10, 6, 4, SplitAxis::Rows).unwrap();
//! let rows: Vec<usize> = regions.iter().map(|r| r.height()).collect();
//! assert_eq!(rows, vec![2, 2, 1, 1]);
//! ```
//!
//! # Used By
//!
//! - `twinfx-ops` - filters iterate only their region
//! - `twinfx-compute` - one parallel task per planned region

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A half-open rectangle of the pixel grid.
///
/// # Invariants
///
/// - `x_begin <= x_end` and `y_begin <= y_end`
/// - A region with zero width or height is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// First column (inclusive)
    pub x_begin: usize,
    /// Last column (exclusive)
    pub x_end: usize,
    /// First row (inclusive)
    pub y_begin: usize,
    /// Last row (exclusive)
    pub y_end: usize,
}

impl Region {
    /// Creates a region from its column and row bounds.
    #[inline]
    pub const fn new(x_begin: usize, x_end: usize, y_begin: usize, y_end: usize) -> Self {
        Self {
            x_begin,
            x_end,
            y_begin,
            y_end,
        }
    }

    /// The whole `width x height` grid.
    #[inline]
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, width, 0, height)
    }

    /// Number of columns.
    #[inline]
    pub const fn width(&self) -> usize {
        self.x_end.saturating_sub(self.x_begin)
    }

    /// Number of rows.
    #[inline]
    pub const fn height(&self) -> usize {
        self.y_end.saturating_sub(self.y_begin)
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns `true` if the region covers no pixel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns `true` if pixel `(x, y)` lies inside the region.
    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_begin && x < self.x_end && y >= self.y_begin && y < self.y_end
    }

    /// Returns `true` if the two regions share at least one pixel.
    #[inline]
    pub const fn intersects(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x_begin < other.x_end
            && other.x_begin < self.x_end
            && self.y_begin < other.y_end
            && other.y_begin < self.y_end
    }

    /// Returns `true` if this region lies inside a `width x height` grid.
    #[inline]
    pub const fn fits(&self, width: usize, height: usize) -> bool {
        self.x_begin <= self.x_end
            && self.y_begin <= self.y_end
            && self.x_end <= width
            && self.y_end <= height
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}) x [{}..{})",
            self.x_begin, self.x_end, self.y_begin, self.y_end
        )
    }
}

/// Axis the planner cuts into stripes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitAxis {
    /// Cut the longer side; rows on ties.
    #[default]
    Longer,
    /// Always cut rows (horizontal stripes of full width).
    Rows,
    /// Always cut columns (vertical stripes of full height).
    Columns,
}

impl SplitAxis {
    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Longer => "longer",
            Self::Rows => "rows",
            Self::Columns => "columns",
        }
    }

    /// Whether rows are cut for a `width x height` image.
    #[inline]
    pub const fn splits_rows(self, width: usize, height: usize) -> bool {
        match self {
            Self::Longer => height >= width,
            Self::Rows => true,
            Self::Columns => false,
        }
    }
}

impl fmt::Display for SplitAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SplitAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "longer" | "auto" => Ok(Self::Longer),
            "rows" | "row" | "y" => Ok(Self::Rows),
            "columns" | "cols" | "column" | "x" => Ok(Self::Columns),
            other => Err(Error::invalid_argument(format!("unknown split axis '{other}'"))),
        }
    }
}

/// Splits a `width x height` image into at most `thread_count` stripes
/// along its longer side.
///
/// Shorthand for [`plan_along`] with [`SplitAxis::Longer`].
pub fn plan(width: usize, height: usize, thread_count: usize) -> Result<Vec<Region>> {
    plan_along(width, height, thread_count, SplitAxis::Longer)
}

/// Splits a `width x height` image into disjoint stripes along `axis`.
///
/// Returns `min(thread_count, axis length)` regions, ordered from the origin
/// outward. Their union is exactly the full grid.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `thread_count == 0`
/// - [`Error::InvalidDimensions`] if either dimension is zero
pub fn plan_along(
    width: usize,
    height: usize,
    thread_count: usize,
    axis: SplitAxis,
) -> Result<Vec<Region>> {
    if thread_count == 0 {
        return Err(Error::invalid_argument("thread count must be positive"));
    }
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "cannot plan an empty image"));
    }

    let split_rows = axis.splits_rows(width, height);
    let length = if split_rows { height } else { width };
    let count = thread_count.min(length);
    let base = length / count;
    let extra = length % count;

    let mut regions = Vec::with_capacity(count);
    let mut begin = 0;
    for i in 0..count {
        let end = begin + base + usize::from(i < extra);
        regions.push(if split_rows {
            Region::new(0, width, begin, end)
        } else {
            Region::new(begin, end, 0, height)
        });
        begin = end;
    }
    debug_assert_eq!(begin, length);

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(width: usize, height: usize, regions: &[Region]) {
        let total: usize = regions.iter().map(Region::area).sum();
        assert_eq!(total, width * height, "union must cover the grid exactly");
        for (i, a) in regions.iter().enumerate() {
            assert!(a.fits(width, height));
            assert!(!a.is_empty());
            for b in &regions[i + 1..] {
                assert!(!a.intersects(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_partition_grid() {
        for width in 1..=17 {
            for height in 1..=13 {
                for threads in 1..=20 {
                    let regions = plan(width, height, threads).unwrap();
                    assert_partition(width, height, &regions);
                    assert_eq!(regions.len(), threads.min(width.max(height)));
                }
            }
        }
    }

    #[test]
    fn test_forced_axes() {
        for axis in [SplitAxis::Rows, SplitAxis::Columns] {
            let regions = plan_along(9, 14, 5, axis).unwrap();
            assert_partition(9, 14, &regions);
        }
        let cols = plan_along(9, 14, 20, SplitAxis::Columns).unwrap();
        assert_eq!(cols.len(), 9);
        assert!(cols.iter().all(|r| r.width() == 1 && r.height() == 14));
    }

    #[test]
    fn test_shares_are_balanced() {
        let regions = plan(1000, 7, 3).unwrap();
        let widths: Vec<usize> = regions.iter().map(Region::width).collect();
        assert_eq!(widths, vec![334, 333, 333]);
        assert!(regions.iter().all(|r| r.height() == 7));
    }

    #[test]
    fn test_rows_two_two_one_one() {
        let regions = plan_along(10, 6, 4, SplitAxis::Rows).unwrap();
        assert_eq!(
            regions,
            vec![
                Region::new(0, 10, 0, 2),
                Region::new(0, 10, 2, 4),
                Region::new(0, 10, 4, 5),
                Region::new(0, 10, 5, 6),
            ]
        );
    }

    #[test]
    fn test_longer_axis_tie_splits_rows() {
        let regions = plan(4, 4, 2).unwrap();
        assert_eq!(regions[0], Region::new(0, 4, 0, 2));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(plan(10, 10, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(plan(0, 10, 2), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_region_geometry() {
        let r = Region::new(2, 5, 1, 3);
        assert_eq!(r.area(), 6);
        assert!(r.contains(2, 1));
        assert!(!r.contains(5, 1));
        assert!(!r.intersects(&Region::new(5, 8, 1, 3)));
        assert!(r.intersects(&Region::new(4, 8, 2, 9)));
        assert_eq!(r.to_string(), "[2..5) x [1..3)");
    }

    #[test]
    fn test_parse_axis() {
        assert_eq!("rows".parse::<SplitAxis>().unwrap(), SplitAxis::Rows);
        assert_eq!("AUTO".parse::<SplitAxis>().unwrap(), SplitAxis::Longer);
        assert!("diagonal".parse::<SplitAxis>().is_err());
    }
}
