use pivfilt_image::{Image, ImageSize};

use crate::error::FilterError;
use crate::parallel::{for_each_row_mut, ExecutionStrategy};

use super::kernels::Kernel;
use super::separable_filter::convolve_separable;

/// Trait for the floating point sample types the engine filters.
///
/// Accumulation always happens in `f64`; results are stored back as `Self`.
pub trait FloatConversion: num_traits::Float + Default + Send + Sync {
    /// Widen the sample to f64
    fn as_f64(&self) -> f64;
    /// Narrow an f64 accumulator to the sample type
    fn from_f64(val: f64) -> Self;
}

impl FloatConversion for f32 {
    fn as_f64(&self) -> f64 {
        *self as f64
    }

    fn from_f64(val: f64) -> Self {
        val as f32
    }
}

impl FloatConversion for f64 {
    fn as_f64(&self) -> f64 {
        *self
    }

    fn from_f64(val: f64) -> Self {
        val
    }
}

/// How the kernel is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConvolutionMethod {
    /// Full `k x k` weighted sum per output sample.
    Direct,
    /// Row pass followed by a column pass with the 1D factor of the kernel.
    #[default]
    Separable,
}

/// Options for controlling the convolution operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvolveOptions {
    /// Direct or separable evaluation.
    pub method: ConvolutionMethod,
    /// Row scheduling of the convolution passes.
    ///
    /// Padding, cropping and transposing around the passes always run on the
    /// global rayon pool.
    pub strategy: ExecutionStrategy,
}

impl ConvolveOptions {
    /// Options with the given method and the default strategy.
    pub fn with_method(method: ConvolutionMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Options with the given strategy and the default method.
    pub fn with_strategy(strategy: ExecutionStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }
}

/// Size of the valid region left after convolving a buffer of `padded` with a
/// kernel of side `kernel_size`.
///
/// Needs only the size, so callers can check the fit before building the kernel.
///
/// # Errors
///
/// Returns [`FilterError::InsufficientPadding`] if the kernel does not fit on either axis.
pub fn valid_output_size(padded: ImageSize, kernel_size: usize) -> Result<ImageSize, FilterError> {
    let k = kernel_size;
    if padded.width < k || padded.height < k {
        return Err(FilterError::InsufficientPadding {
            width: padded.width,
            height: padded.height,
            kernel_size: k,
        });
    }
    Ok(ImageSize {
        width: padded.width - (k - 1),
        height: padded.height - (k - 1),
    })
}

/// Convolve a padded buffer with a kernel.
///
/// Only positions where the kernel fully overlaps `padded` are computed, so the
/// output is `2r` samples smaller than `padded` on each axis. Output `(y, x)` is
/// the weighted sum of the neighborhood centered at padded `(y + r, x + r)`.
///
/// # Arguments
///
/// * `padded` - The padded source buffer.
/// * `kernel` - The Gaussian kernel.
/// * `options` - Evaluation method and execution strategy.
///
/// # Errors
///
/// Returns [`FilterError::InsufficientPadding`] if `padded` is smaller than the kernel.
///
/// # Example
///
/// ```
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::filter::{convolve, ConvolveOptions, Kernel};
///
/// let padded = Image::from_size_val(ImageSize { width: 7, height: 6 }, 0.25f32).unwrap();
/// let kernel = Kernel::gaussian(3, 1.0).unwrap();
///
/// let out = convolve(&padded, &kernel, &ConvolveOptions::default()).unwrap();
///
/// assert_eq!(out.size(), ImageSize { width: 5, height: 4 });
/// ```
pub fn convolve<T: FloatConversion>(
    padded: &Image<T>,
    kernel: &Kernel,
    options: &ConvolveOptions,
) -> Result<Image<T>, FilterError> {
    match options.method {
        ConvolutionMethod::Direct => convolve_direct(padded, kernel, options.strategy),
        ConvolutionMethod::Separable => convolve_separable(padded, kernel, options.strategy),
    }
}

/// Convolve a padded buffer with the full 2D kernel.
///
/// See [`convolve`] for the output geometry.
pub fn convolve_direct<T: FloatConversion>(
    padded: &Image<T>,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<Image<T>, FilterError> {
    let out_size = valid_output_size(padded.size(), kernel.size())?;
    let mut dst = Image::from_size_val(out_size, T::zero())?;

    let k = kernel.size();
    let weights = kernel.weights();
    let src_cols = padded.cols();
    let src_data = padded.as_slice();

    for_each_row_mut(strategy, dst.as_slice_mut(), out_size.width, |y, dst_row| {
        for (x, out) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for (i, kernel_row) in weights.chunks_exact(k).enumerate() {
                let offset = (y + i) * src_cols + x;
                let window = &src_data[offset..offset + k];
                for (&w, v) in kernel_row.iter().zip(window.iter()) {
                    acc += w * v.as_f64();
                }
            }
            *out = T::from_f64(acc);
        }
    })?;

    Ok(dst)
}
