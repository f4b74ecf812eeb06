//! Filter operations
//!
//! Gaussian kernels, the convolution engine and the lowpass, highpass and
//! local variance normalization operations built on top of them.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Direct 2D convolution and the engine entry point
mod convolution;
pub use convolution::*;

/// Filter operations
mod ops;
pub use ops::*;

/// Filter parameters
mod params;
pub use params::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
