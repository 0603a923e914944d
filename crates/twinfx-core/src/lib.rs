//! # twinfx-core
//!
//! Core types for running one image filter two ways (a single sequential
//! pass and a set of parallel region tasks) and comparing the results.
//!
//! - [`PixelBuffer`] - Owned 8-bit source image
//! - [`OutputBuffer`] - Shared destination for concurrent region writers
//! - [`ColorSpace`] - RGB / HSV / Grayscale working layouts
//! - [`Region`], [`plan`] - Disjoint stripes covering an image
//! - [`ImageCodec`], [`ContainerFormat`] - Codec collaborator interface
//!
//! ## Crate Structure
//!
//! ```text
//! twinfx-core (this crate)
//!    ^
//!    |
//!    +-- twinfx-ops (filter library)
//!    +-- twinfx-io (codec)
//!    +-- twinfx-compute (worker pool, job controller)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod codec;
pub mod colorspace;
pub mod error;
pub mod region;

pub use buffer::{OutputBuffer, PixelBuffer};
pub use codec::{ContainerFormat, ImageCodec};
pub use colorspace::{ColorSpace, BACKGROUND, HSV_HUE, HSV_SATURATION, HSV_VALUE, HUE_STEPS};
pub use error::{Error, Result};
pub use region::{plan, plan_along, Region, SplitAxis};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::{OutputBuffer, PixelBuffer};
    pub use crate::codec::{ContainerFormat, ImageCodec};
    pub use crate::colorspace::ColorSpace;
    pub use crate::error::{Error, Result};
    pub use crate::region::{plan, plan_along, Region, SplitAxis};
}
