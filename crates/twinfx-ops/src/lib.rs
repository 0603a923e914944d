//! # twinfx-ops
//!
//! Region-aware pixel filters.
//!
//! Every filter reads a whole [`PixelBuffer`](twinfx_core::PixelBuffer) and
//! writes only the requested [`Region`](twinfx_core::Region) of an
//! [`OutputBuffer`](twinfx_core::OutputBuffer). Splitting an image into
//! stripes and filtering each one gives exactly the result of one
//! whole-image pass, which is what lets the compute layer fan a job out
//! across worker threads.
//!
//! # Modules
//!
//! - [`catalog`] - The [`Filter`] enum and its dispatch
//! - [`point`] - Per-pixel filters
//! - [`smooth`] - Blur, median, gaussian
//! - [`sharpen`] - Unsharp mask and Laplacians
//! - [`mask`] - Convolution masks and [`EdgeMode`]
//! - [`intensity`] - Intensity normalization
//!
//! # Example
//!
//! ```rust
//! use twinfx_core::{ColorSpace, OutputBuffer, PixelBuffer};
//! use twinfx_ops::{Filter, FilterOptions};
//!
//! let src = PixelBuffer::filled(8, 8, ColorSpace::Rgb, &[200, 100, 50]).unwrap();
//! let dst = OutputBuffer::like(&src);
//! Filter::Negative
//!     .apply(&src, src.bounds(), 0, &FilterOptions::default(), &dst)
//!     .unwrap();
//! assert_eq!(dst.snapshot().pixel(3, 3), &[55, 155, 205]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod support;

pub mod catalog;
pub mod intensity;
pub mod mask;
pub mod point;
pub mod sharpen;
pub mod smooth;

pub use catalog::{Filter, FilterOptions};
pub use error::{OpsError, OpsResult};
pub use intensity::{remap, DEFAULT_INTENSITY, INTENSITY_MAX, INTENSITY_MIN};
pub use mask::{EdgeMode, Mask};
