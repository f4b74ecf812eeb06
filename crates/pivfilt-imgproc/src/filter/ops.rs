use pivfilt_image::Image;

use crate::crop::crop_border;
use crate::error::FilterError;
use crate::padding::pad_uniform;

use super::convolution::{convolve, valid_output_size, ConvolveOptions, FloatConversion};
use super::kernels::{validate_gaussian_params, Kernel};
use super::params::{OutputRange, VarianceNormParams};

/// Blur a padded buffer with a Gaussian kernel.
///
/// `src` must already be padded by `kernel_size / 2` samples on every side; the
/// result has the size of the unpadded image.
///
/// # Arguments
///
/// * `src` - The padded source buffer with shape (H + 2r, W + 2r).
/// * `kernel_size` - The odd side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Errors
///
/// [`FilterError::InvalidParameter`] for an invalid kernel, reported before any
/// buffer work, or [`FilterError::InsufficientPadding`] if `src` is smaller than
/// the kernel.
///
/// # Example
///
/// ```
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::filter::lowpass;
///
/// let padded = Image::from_size_val(ImageSize { width: 6, height: 6 }, 0.5f32).unwrap();
/// let blurred = lowpass(&padded, 3, 1.0).unwrap();
///
/// assert_eq!(blurred.size(), ImageSize { width: 4, height: 4 });
/// assert!(blurred.as_slice().iter().all(|v| (v - 0.5).abs() < 1e-6));
/// ```
pub fn lowpass<T: FloatConversion>(
    src: &Image<T>,
    kernel_size: usize,
    sigma: f32,
) -> Result<Image<T>, FilterError> {
    lowpass_with_options(src, kernel_size, sigma, &ConvolveOptions::default())
}

/// [`lowpass`] with explicit convolution options.
pub fn lowpass_with_options<T: FloatConversion>(
    src: &Image<T>,
    kernel_size: usize,
    sigma: f32,
    options: &ConvolveOptions,
) -> Result<Image<T>, FilterError> {
    let kernel = fitted_kernel(src, kernel_size, sigma)?;
    convolve(src, &kernel, options)
}

/// Subtract the Gaussian blur of a padded buffer from its interior.
///
/// The interior is `src` with `kernel_size / 2` samples removed from every side,
/// i.e. the region the blur addresses. With `clip_at_zero`, negative responses
/// are set to zero; the sign of dark detail is lost.
///
/// # Arguments
///
/// * `src` - The padded source buffer with shape (H + 2r, W + 2r).
/// * `kernel_size` - The odd side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
/// * `clip_at_zero` - Whether to drop negative responses.
pub fn highpass<T: FloatConversion>(
    src: &Image<T>,
    kernel_size: usize,
    sigma: f32,
    clip_at_zero: bool,
) -> Result<Image<T>, FilterError> {
    highpass_with_options(
        src,
        kernel_size,
        sigma,
        clip_at_zero,
        &ConvolveOptions::default(),
    )
}

/// [`highpass`] with explicit convolution options.
pub fn highpass_with_options<T: FloatConversion>(
    src: &Image<T>,
    kernel_size: usize,
    sigma: f32,
    clip_at_zero: bool,
    options: &ConvolveOptions,
) -> Result<Image<T>, FilterError> {
    let kernel = fitted_kernel(src, kernel_size, sigma)?;
    let background = convolve(src, &kernel, options)?;

    let mut dst = crop_border(src, kernel.radius())?;
    dst.as_slice_mut()
        .iter_mut()
        .zip(background.as_slice().iter())
        .for_each(|(px, &low)| {
            let diff = *px - low;
            *px = if clip_at_zero && diff < T::zero() {
                T::zero()
            } else {
                diff
            };
        });

    Ok(dst)
}

/// Normalize a padded buffer by its local mean and local standard deviation.
///
/// Uses the default epsilon, re-padding policy and output range of
/// [`VarianceNormParams`].
///
/// # Arguments
///
/// * `src` - The padded source buffer with shape (H + 2r, W + 2r).
/// * `kernel_size` - The odd side length of both kernels.
/// * `sigma1` - The sigma of the local mean kernel.
/// * `sigma2` - The sigma of the local variance kernel.
pub fn variance_normalize<T: FloatConversion>(
    src: &Image<T>,
    kernel_size: usize,
    sigma1: f32,
    sigma2: f32,
) -> Result<Image<T>, FilterError> {
    variance_normalize_with_params(
        src,
        &VarianceNormParams::new(kernel_size, sigma1, sigma2),
        &ConvolveOptions::default(),
    )
}

/// Normalize a padded buffer by its local mean and local standard deviation.
///
/// With `dev = interior(src) - lowpass(src, sigma1)` the result is
/// `dev / sqrt(lowpass(pad(dev²), sigma2) + epsilon)`. The squared deviation
/// field is `2r` smaller than `src`, so it is re-padded by `r` with
/// `params.repad_mode` before the second blur.
///
/// # Errors
///
/// [`FilterError::InvalidParameter`] for invalid kernels or epsilon, reported
/// before any buffer work, or [`FilterError::InsufficientPadding`].
pub fn variance_normalize_with_params<T: FloatConversion>(
    src: &Image<T>,
    params: &VarianceNormParams,
    options: &ConvolveOptions,
) -> Result<Image<T>, FilterError> {
    params.validate()?;
    valid_output_size(src.size(), params.kernel_size)?;
    let mean_kernel = Kernel::gaussian(params.kernel_size, params.sigma1)?;
    let var_kernel = Kernel::gaussian(params.kernel_size, params.sigma2)?;
    let r = mean_kernel.radius();

    let local_mean = convolve(src, &mean_kernel, options)?;

    let mut dst = crop_border(src, r)?;
    dst.as_slice_mut()
        .iter_mut()
        .zip(local_mean.as_slice().iter())
        .for_each(|(px, &mean)| *px = *px - mean);

    let squared = dst.map(|&dev| dev * dev);
    let squared = pad_uniform(&squared, r, params.repad_mode)?;
    let local_var = convolve(&squared, &var_kernel, options)?;

    let epsilon = T::from_f64(params.epsilon as f64);
    dst.as_slice_mut()
        .iter_mut()
        .zip(local_var.as_slice().iter())
        .for_each(|(px, &var)| *px = *px / (var + epsilon).sqrt());

    if let OutputRange::MaxNormalized = params.output_range {
        normalize_by_max(&mut dst);
    }

    Ok(dst)
}

// the kernel is only allocated once it is known to fit `src`
fn fitted_kernel<T>(src: &Image<T>, kernel_size: usize, sigma: f32) -> Result<Kernel, FilterError> {
    validate_gaussian_params(kernel_size, sigma)?;
    valid_output_size(src.size(), kernel_size)?;
    Kernel::gaussian(kernel_size, sigma)
}

// divides by the largest value; left untouched if nothing is positive
fn normalize_by_max<T: FloatConversion>(img: &mut Image<T>) {
    let max_val = img
        .as_slice()
        .iter()
        .fold(T::zero(), |acc, &v| if v > acc { v } else { acc });
    if max_val > T::zero() {
        img.as_slice_mut().iter_mut().for_each(|v| *v = *v / max_val);
    }
}
