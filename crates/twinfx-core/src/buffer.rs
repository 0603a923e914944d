//! Pixel storage.
//!
//! - [`PixelBuffer`] - Owned, immutable-once-shared source image
//! - [`OutputBuffer`] - Shared destination written concurrently by tasks
//!
//! # Memory Layout
//!
//! Both buffers store 8-bit samples in **row-major** order, channels
//! interleaved:
//!
//! ```text
//! Memory: [c0 c1 c2 c0 c1 c2 ...]  ← Row 0
//!         [c0 c1 c2 c0 c1 c2 ...]  ← Row 1
//! ```
//!
//! # Concurrent Writes
//!
//! An [`OutputBuffer`] is shared by reference between every task of a job.
//! Each sample is an [`AtomicU8`], so disjoint writers and a reader taking a
//! progress [`snapshot`](OutputBuffer::snapshot) never race. Samples use
//! relaxed ordering; the job's completion flag publishes the finished writes.

use crate::{ColorSpace, Error, Region, Result, BACKGROUND};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

fn checked_len(width: usize, height: usize, color_space: ColorSpace) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "width and height must be > 0"));
    }
    width
        .checked_mul(height)
        .and_then(|px| px.checked_mul(color_space.channels()))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}

/// Owned 8-bit image in one of the working color spaces.
///
/// # Example
///
/// ```rust
/// use twinfx_core::{ColorSpace, PixelBuffer};
///
/// let mut img = PixelBuffer::new(4, 2, ColorSpace::Rgb).unwrap();
/// img.set_pixel(1, 1, &[10, 20, 30]);
/// assert_eq!(img.pixel(1, 1), &[10, 20, 30]);
/// assert_eq!(img.data().len(), 4 * 2 * 3);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    color_space: ColorSpace,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a buffer filled with the background value.
    pub fn new(width: usize, height: usize, color_space: ColorSpace) -> Result<Self> {
        let len = checked_len(width, height, color_space)?;
        Ok(Self {
            width,
            height,
            color_space,
            data: vec![BACKGROUND; len],
        })
    }

    /// Wraps existing interleaved samples.
    ///
    /// # Errors
    ///
    /// [`Error::BufferSize`] if `data.len() != width * height * channels`.
    pub fn from_raw(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = checked_len(width, height, color_space)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Creates a buffer where every pixel equals `pixel`.
    pub fn filled(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        pixel: &[u8],
    ) -> Result<Self> {
        if pixel.len() != color_space.channels() {
            return Err(Error::BufferSize {
                expected: color_space.channels(),
                got: pixel.len(),
            });
        }
        let len = checked_len(width, height, color_space)?;
        let data = pixel.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Creates a buffer by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        mut f: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> u8,
    {
        let mut img = Self::new(width, height, color_space)?;
        let channels = color_space.channels();
        for y in 0..height {
            for x in 0..width {
                let base = (y * width + x) * channels;
                for c in 0..channels {
                    img.data[base + c] = f(x, y, c);
                }
            }
        }
        Ok(img)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel (1 or 3).
    #[inline]
    pub fn channels(&self) -> usize {
        self.color_space.channels()
    }

    /// Color space tag.
    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// The full grid as a region.
    #[inline]
    pub fn bounds(&self) -> Region {
        Region::full(self.width, self.height)
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offset of the first sample of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels()
    }

    /// Samples of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = self.index(x, y);
        &self.data[i..i + self.channels()]
    }

    /// One sample of pixel `(x, y)`.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.data[self.index(x, y) + channel]
    }

    /// Overwrites pixel `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: &[u8]) {
        let i = self.index(x, y);
        let n = self.channels();
        self.data[i..i + n].copy_from_slice(&pixel[..n]);
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Destination buffer shared between the tasks of one job.
///
/// Every task writes only the samples of its own region through `&self`;
/// see the module docs for the ordering contract.
pub struct OutputBuffer {
    width: usize,
    height: usize,
    color_space: ColorSpace,
    data: Box<[AtomicU8]>,
}

impl OutputBuffer {
    /// Creates a background-filled buffer.
    pub fn new(width: usize, height: usize, color_space: ColorSpace) -> Result<Self> {
        let len = checked_len(width, height, color_space)?;
        Ok(Self {
            width,
            height,
            color_space,
            data: (0..len).map(|_| AtomicU8::new(BACKGROUND)).collect(),
        })
    }

    /// Creates a background-filled buffer with the geometry of `source`.
    pub fn like(source: &PixelBuffer) -> Self {
        Self {
            width: source.width,
            height: source.height,
            color_space: source.color_space,
            data: (0..source.data.len()).map(|_| AtomicU8::new(BACKGROUND)).collect(),
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.color_space.channels()
    }

    /// Color space tag.
    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Returns `true` if `source` has the same geometry and color space.
    #[inline]
    pub fn matches(&self, source: &PixelBuffer) -> bool {
        self.width == source.width
            && self.height == source.height
            && self.color_space == source.color_space
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels()
    }

    /// Writes one sample of pixel `(x, y)`.
    #[inline]
    pub fn store(&self, x: usize, y: usize, channel: usize, value: u8) {
        self.data[self.index(x, y) + channel].store(value, Ordering::Relaxed);
    }

    /// Writes every channel of pixel `(x, y)`.
    #[inline]
    pub fn store_pixel(&self, x: usize, y: usize, pixel: &[u8]) {
        let base = self.index(x, y);
        for (slot, &v) in self.data[base..base + self.channels()].iter().zip(pixel) {
            slot.store(v, Ordering::Relaxed);
        }
    }

    /// Reads one sample of pixel `(x, y)`.
    #[inline]
    pub fn load(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.data[self.index(x, y) + channel].load(Ordering::Relaxed)
    }

    /// Copies the current contents into an owned [`PixelBuffer`].
    ///
    /// May observe a partially written image while a job is running.
    pub fn snapshot(&self) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            color_space: self.color_space,
            data: self.data.iter().map(|s| s.load(Ordering::Relaxed)).collect(),
        }
    }
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_is_background() {
        let img = PixelBuffer::new(3, 2, ColorSpace::Hsv).unwrap();
        assert!(img.data().iter().all(|&v| v == BACKGROUND));
        assert_eq!(img.channels(), 3);
    }

    #[test]
    fn test_from_raw_validates_len() {
        assert!(PixelBuffer::from_raw(2, 2, ColorSpace::Grayscale, vec![1, 2, 3, 4]).is_ok());
        let err = PixelBuffer::from_raw(2, 2, ColorSpace::Rgb, vec![0; 4]).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 12, got: 4 }));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 5, ColorSpace::Rgb),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(OutputBuffer::new(5, 0, ColorSpace::Rgb).is_err());
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let img = PixelBuffer::filled(3, 3, ColorSpace::Rgb, &[1, 2, 3]).unwrap();
        assert_eq!(img.pixel(2, 2), &[1, 2, 3]);
        assert_eq!(img.sample(0, 1, 2), 3);
        assert!(PixelBuffer::filled(3, 3, ColorSpace::Rgb, &[1]).is_err());
    }

    #[test]
    fn test_from_fn_layout() {
        let img = PixelBuffer::from_fn(4, 3, ColorSpace::Grayscale, |x, y, _| (y * 4 + x) as u8)
            .unwrap();
        assert_eq!(img.data(), &(0..12).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn test_output_store_and_snapshot() {
        let src = PixelBuffer::new(2, 2, ColorSpace::Rgb).unwrap();
        let out = OutputBuffer::like(&src);
        assert!(out.matches(&src));
        out.store_pixel(1, 0, &[7, 8, 9]);
        out.store(0, 1, 2, 42);
        let snap = out.snapshot();
        assert_eq!(snap.pixel(1, 0), &[7, 8, 9]);
        assert_eq!(out.load(0, 1, 2), 42);
    }

    #[test]
    fn test_disjoint_concurrent_writers() {
        let out = Arc::new(OutputBuffer::new(64, 8, ColorSpace::Grayscale).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|row| {
                let out = Arc::clone(&out);
                thread::spawn(move || {
                    for x in 0..64 {
                        out.store(x, row, 0, row as u8 + 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = out.snapshot();
        for y in 0..8 {
            assert!((0..64).all(|x| snap.sample(x, y, 0) == y as u8 + 1));
        }
    }
}
