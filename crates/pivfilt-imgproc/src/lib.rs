#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// boundary adapter between raw images and the filter engine.
pub mod adapter;

/// image cropping module.
pub mod crop;

/// error types for the filtering engine.
pub mod error;

/// image filtering module.
pub mod filter;

/// spatial padding module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// image transposition module.
pub mod transpose;

pub use crate::error::FilterError;
