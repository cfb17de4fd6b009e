//! CPU-side resources consumed by the projection core.
//!
//! - [`Geometry`]: vertex data with a change-detection version counter
//! - [`LoadedImage`] / [`ImageSource`]: the image consumption contract

pub mod geometry;
pub mod image;

pub use geometry::Geometry;
pub use image::{ImageSource, LoadedImage, MemoryImageSource};
