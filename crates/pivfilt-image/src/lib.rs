#![deny(missing_docs)]
//! Single-channel image buffer types for pivfilt

/// image representation for filtering purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

/// operations over image buffers.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
