use pivfilt_image::ImageError;

use crate::parallel::ParallelError;

/// Errors raised by the filtering engine and its boundary adapter.
///
/// Every error is terminal for the call that produced it: no partial output
/// is returned and nothing is retried.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// A kernel size, sigma or epsilon outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The padded buffer is smaller than the kernel on at least one axis.
    #[error("insufficient padding: buffer of {width}x{height} is smaller than a {kernel_size}x{kernel_size} kernel")]
    InsufficientPadding {
        /// Width of the buffer handed to the convolution.
        width: usize,
        /// Height of the buffer handed to the convolution.
        height: usize,
        /// Side length of the kernel.
        kernel_size: usize,
    },

    /// The input is not a non-empty two dimensional image.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error from the image buffer layer.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the parallel execution layer.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
