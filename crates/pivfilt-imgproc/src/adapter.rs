//! Boundary adapter between raw images and the filter engine.
//!
//! The engine in [`crate::filter`] works on padded, range-normalized `f32`
//! buffers. The functions here accept images of any supported element type and
//! take care of the bookkeeping around one filter call:
//!
//! 1. if the largest sample exceeds `1.0`, the buffer is divided by it; images
//!    already within `[0, 1]` pass through unscaled,
//! 2. images taller than they are wide are transposed so rows are the long axis,
//! 3. the buffer is padded by `kernel_size / 2` with [`PaddingMode::Reflect101`],
//! 4. the filter runs,
//! 5. the scaling and the transpose are undone and samples are converted back
//!    to the input element type.
//!
//! # Example
//!
//! ```
//! use pivfilt_image::{Image, ImageSize};
//! use pivfilt_imgproc::adapter::lowpass_filter;
//!
//! let image = Image::new(ImageSize { width: 4, height: 2 }, vec![10u8; 8]).unwrap();
//! let blurred = lowpass_filter(&image, 3, 1.0).unwrap();
//!
//! assert_eq!(blurred.as_slice(), image.as_slice());
//! ```

use log::{debug, trace};
use pivfilt_image::{
    ops::{cast_and_scale, max_value},
    Image, ImageSize,
};

use crate::error::FilterError;
use crate::filter::{
    highpass_with_options, lowpass_with_options, variance_normalize_with_params, ConvolveOptions,
    FilterKind, HighpassParams, LowpassParams, OutputRange, VarianceNormParams,
};
use crate::padding::{pad_uniform, PaddingMode};
use crate::transpose::transpose;

/// Element types the adapter accepts.
pub trait AdapterPixel: Copy + Default + PartialOrd + Send + Sync + num_traits::NumCast {
    /// Whether the type only holds whole numbers
    const IS_INTEGER: bool;
    /// Convert the sample to f32
    fn to_f32(self) -> f32;
    /// Convert an f32 result back, saturating integer types
    fn from_f32(val: f32) -> Self;
}

impl AdapterPixel for u8 {
    const IS_INTEGER: bool = true;

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, u8::MAX as f32) as u8
    }
}

impl AdapterPixel for u16 {
    const IS_INTEGER: bool = true;

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, u16::MAX as f32) as u16
    }
}

impl AdapterPixel for f32 {
    const IS_INTEGER: bool = false;

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl AdapterPixel for f64 {
    const IS_INTEGER: bool = false;

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(val: f32) -> Self {
        val as f64
    }
}

/// Gaussian lowpass filter of an unpadded image.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `kernel_size` - The odd side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
pub fn lowpass_filter<T: AdapterPixel>(
    image: &Image<T>,
    kernel_size: usize,
    sigma: f32,
) -> Result<Image<T>, FilterError> {
    apply(image, &FilterKind::Lowpass(LowpassParams { kernel_size, sigma }))
}

/// Gaussian highpass filter of an unpadded image.
///
/// Negative responses of unsigned integer images saturate to zero on the way
/// back, whether or not `clip_at_zero` is set.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `kernel_size` - The odd side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
/// * `clip_at_zero` - Whether to drop negative responses.
pub fn highpass_filter<T: AdapterPixel>(
    image: &Image<T>,
    kernel_size: usize,
    sigma: f32,
    clip_at_zero: bool,
) -> Result<Image<T>, FilterError> {
    apply(
        image,
        &FilterKind::Highpass(HighpassParams {
            kernel_size,
            sigma,
            clip_at_zero,
        }),
    )
}

/// Local variance normalization of an unpadded image.
///
/// For integer element types the result is divided by its maximum
/// ([`OutputRange::MaxNormalized`]) so it maps back onto `[0, max(image)]`
/// instead of saturating; float types get the raw local z-score. Use [`apply`]
/// with explicit [`VarianceNormParams`] to choose otherwise.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `kernel_size` - The odd side length of both kernels.
/// * `sigma1` - The sigma of the local mean kernel.
/// * `sigma2` - The sigma of the local variance kernel.
pub fn variance_normalization_filter<T: AdapterPixel>(
    image: &Image<T>,
    kernel_size: usize,
    sigma1: f32,
    sigma2: f32,
) -> Result<Image<T>, FilterError> {
    let output_range = if T::IS_INTEGER {
        OutputRange::MaxNormalized
    } else {
        OutputRange::Raw
    };
    let params = VarianceNormParams {
        output_range,
        ..VarianceNormParams::new(kernel_size, sigma1, sigma2)
    };
    apply(image, &FilterKind::VarianceNormalization(params))
}

/// Run one filter on an unpadded image with default convolution options.
pub fn apply<T: AdapterPixel>(image: &Image<T>, kind: &FilterKind) -> Result<Image<T>, FilterError> {
    apply_with_options(image, kind, &ConvolveOptions::default())
}

/// Run one filter on an unpadded image.
///
/// # Errors
///
/// Parameters are validated first and fail with [`FilterError::InvalidParameter`];
/// an empty image fails with [`FilterError::DimensionMismatch`]. A kernel whose
/// radius exceeds the longer image side fails with
/// [`FilterError::InsufficientPadding`]. None of these touch the pixel data.
pub fn apply_with_options<T: AdapterPixel>(
    image: &Image<T>,
    kind: &FilterKind,
    options: &ConvolveOptions,
) -> Result<Image<T>, FilterError> {
    kind.validate()?;
    if image.is_empty() {
        return Err(FilterError::DimensionMismatch(format!(
            "expected a non-empty 2D image, got {}",
            image.size()
        )));
    }

    let kernel_size = kind.kernel_size();
    if kernel_size / 2 > image.width().max(image.height()) {
        return Err(FilterError::InsufficientPadding {
            width: image.width(),
            height: image.height(),
            kernel_size,
        });
    }

    let prepared = Prepared::new(image, kind)?;

    let filtered = match kind {
        FilterKind::Lowpass(p) => {
            lowpass_with_options(&prepared.padded, p.kernel_size, p.sigma, options)?
        }
        FilterKind::Highpass(p) => highpass_with_options(
            &prepared.padded,
            p.kernel_size,
            p.sigma,
            p.clip_at_zero,
            options,
        )?,
        FilterKind::VarianceNormalization(p) => {
            variance_normalize_with_params(&prepared.padded, p, options)?
        }
    };

    prepared.restore(filtered)
}

/// Run one filter on a row-major buffer described by `shape`.
///
/// `shape` is `[height, width]`; any other rank, a zero extent, or a length
/// that does not match the shape is a [`FilterError::DimensionMismatch`].
///
/// # Example
///
/// ```
/// use pivfilt_imgproc::adapter::filter_from_slice;
/// use pivfilt_imgproc::filter::{FilterKind, HighpassParams};
/// use pivfilt_imgproc::FilterError;
///
/// let kind = FilterKind::Highpass(HighpassParams::default());
/// let out = filter_from_slice(&[0.5f32; 12], &[3, 4], &kind).unwrap();
/// assert_eq!(out.len(), 12);
///
/// let res = filter_from_slice(&[0.5f32; 12], &[12], &kind);
/// assert!(matches!(res, Err(FilterError::DimensionMismatch(_))));
/// ```
pub fn filter_from_slice<T: AdapterPixel>(
    data: &[T],
    shape: &[usize],
    kind: &FilterKind,
) -> Result<Vec<T>, FilterError> {
    let &[height, width] = shape else {
        return Err(FilterError::DimensionMismatch(format!(
            "expected a 2D shape, got {} dimensions",
            shape.len()
        )));
    };

    let size = ImageSize { width, height };
    if size.is_empty() || data.len() != size.num_pixels() {
        return Err(FilterError::DimensionMismatch(format!(
            "{} samples do not form a non-empty {height}x{width} image",
            data.len()
        )));
    }

    let image = Image::new(size, data.to_vec())?;
    Ok(apply(&image, kind)?.into_vec())
}

// the engine-side buffer and what it takes to undo its preparation
struct Prepared {
    padded: Image<f32>,
    scale: Option<f32>,
    transposed: bool,
}

impl Prepared {
    fn new<T: AdapterPixel>(image: &Image<T>, kind: &FilterKind) -> Result<Self, FilterError> {
        let name = kind.name();
        let max_val = max_value(image).map(|v| v.to_f32()).unwrap_or(0.0);
        let scale = (max_val > 1.0).then_some(max_val);

        let mut buffer = Image::from_size_val(image.size(), 0.0f32)?;
        if let Some(scale) = scale {
            debug!("{name}: scaling input range by 1/{scale}");
        }
        cast_and_scale(image, &mut buffer, scale.map_or(1.0, f32::recip))?;

        let transposed = image.height() > image.width();
        if transposed {
            debug!("{name}: transposing {} input", image.size());
            buffer = transpose(&buffer)?;
        }

        let pad = kind.kernel_size() / 2;
        let padded = pad_uniform(&buffer, pad, PaddingMode::Reflect101)?;
        trace!("{name}: padded {} to {} by {pad}", buffer.size(), padded.size());

        Ok(Self {
            padded,
            scale,
            transposed,
        })
    }

    fn restore<T: AdapterPixel>(&self, mut filtered: Image<f32>) -> Result<Image<T>, FilterError> {
        if let Some(scale) = self.scale {
            filtered.as_slice_mut().iter_mut().for_each(|v| *v *= scale);
        }
        if self.transposed {
            filtered = transpose(&filtered)?;
        }
        Ok(filtered.map(|&v| T::from_f32(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{lowpass, Kernel};
    use approx::assert_relative_eq;

    fn particles(width: usize, height: usize) -> Image<u8> {
        Image::from_fn(ImageSize { width, height }, |y, x| {
            if (y % 5 == 2) && (x % 7 == 3) {
                220
            } else {
                ((y * 3 + x) % 20) as u8
            }
        })
    }

    #[test]
    fn test_identity_kernel_roundtrip_u8() -> Result<(), FilterError> {
        let image = particles(13, 9);
        assert_eq!(lowpass_filter(&image, 1, 1.0)?, image);
        Ok(())
    }

    #[test]
    fn test_unit_range_passes_unscaled() -> Result<(), FilterError> {
        let image = Image::from_fn(ImageSize { width: 8, height: 6 }, |y, x| {
            ((y * 8 + x) % 5) as f32 / 4.0
        });

        let via_adapter = lowpass_filter(&image, 3, 0.8)?;
        let padded = pad_uniform(&image, 1, PaddingMode::Reflect101)?;
        let direct = lowpass(&padded, 3, 0.8)?;

        assert_eq!(via_adapter, direct);
        Ok(())
    }

    #[test]
    fn test_center_impulse_keeps_range() -> Result<(), FilterError> {
        let mut image = Image::from_size_val(ImageSize { width: 5, height: 5 }, 0.0f32)?;
        if let Some(px) = image.get_mut([2, 2]) {
            *px = 100.0;
        }

        let out = lowpass_filter(&image, 3, 1.0)?;
        let kernel = Kernel::gaussian(3, 1.0)?;

        assert_eq!(out.size(), image.size());
        assert_relative_eq!(
            out.get([2, 2]).copied().unwrap_or(f32::NAN),
            (kernel.center_weight() * 100.0) as f32,
            max_relative = 1e-5
        );
        assert!(out.as_slice().iter().all(|&v| v >= 0.0));
        Ok(())
    }

    #[test]
    fn test_tall_image_is_orientation_agnostic() -> Result<(), FilterError> {
        let tall = Image::from_fn(ImageSize { width: 6, height: 11 }, |y, x| {
            ((y * 5 + x * 3) % 9) as f32 / 8.0
        });

        for kind in [
            FilterKind::Lowpass(LowpassParams::default()),
            FilterKind::Highpass(HighpassParams::default()),
            FilterKind::VarianceNormalization(VarianceNormParams::new(5, 1.0, 1.5)),
        ] {
            let out = apply(&tall, &kind)?;
            assert_eq!(out.size(), tall.size());

            let wide = transpose(&tall)?;
            let out_wide = apply(&wide, &kind)?;
            assert_eq!(transpose(&out_wide)?, out);
        }
        Ok(())
    }

    #[test]
    fn test_kernel_larger_than_image() -> Result<(), FilterError> {
        let image = Image::new(
            ImageSize { width: 3, height: 2 },
            vec![0.1f32, 0.2, 0.3, 0.4, 0.3, 0.2],
        )?;
        let out = lowpass_filter(&image, 7, 2.0)?;
        assert_eq!(out.size(), image.size());
        assert!(out
            .as_slice()
            .iter()
            .all(|v| (0.1 - 1e-6..=0.4 + 1e-6).contains(v)));
        Ok(())
    }

    #[test]
    fn test_integer_types_saturate() -> Result<(), FilterError> {
        let image = particles(14, 10);
        let high = highpass_filter(&image, 3, 1.0, false)?;
        assert_eq!(high.size(), image.size());

        let wide: Image<u16> = image.map(|&v| v as u16 * 200);
        let out = variance_normalization_filter(&wide, 3, 1.0, 1.0)?;
        assert_eq!(out.size(), wide.size());

        assert_eq!(u8::from_f32(-3.0), 0);
        assert_eq!(u8::from_f32(300.0), 255);
        assert_eq!(u8::from_f32(36.99998), 37);
        assert_eq!(u16::from_f32(70000.0), u16::MAX);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() -> Result<(), FilterError> {
        let kind = FilterKind::Lowpass(LowpassParams::default());

        let empty = Image::<f32>::new(ImageSize { width: 0, height: 4 }, vec![])?;
        assert!(matches!(
            apply(&empty, &kind),
            Err(FilterError::DimensionMismatch(_))
        ));

        for shape in [&[2usize, 3, 1][..], &[0, 6], &[2, 2]] {
            assert!(matches!(
                filter_from_slice(&[1u8; 6], shape, &kind),
                Err(FilterError::DimensionMismatch(_))
            ));
        }

        let out = filter_from_slice(&[1u8; 6], &[2, 3], &kind)?;
        assert_eq!(out, vec![1u8; 6]);
        Ok(())
    }

    #[test]
    fn test_even_kernel_rejected() -> Result<(), FilterError> {
        let image = particles(8, 8);
        assert!(matches!(
            lowpass_filter(&image, 4, 1.0),
            Err(FilterError::InvalidParameter(_))
        ));
        assert!(matches!(
            highpass_filter(&image, 4, 1.0, false),
            Err(FilterError::InvalidParameter(_))
        ));
        assert!(matches!(
            variance_normalization_filter(&image, 4, 1.0, 1.0),
            Err(FilterError::InvalidParameter(_))
        ));
        Ok(())
    }

    #[test]
    fn test_kernel_radius_bounded_by_image() -> Result<(), FilterError> {
        let image = particles(5, 4);
        let kernel_size = usize::MAX - 2;
        let expected = Err(FilterError::InsufficientPadding {
            width: 5,
            height: 4,
            kernel_size,
        });

        assert_eq!(lowpass_filter(&image, kernel_size, 1.0), expected);
        assert_eq!(highpass_filter(&image, kernel_size, 1.0, true), expected);
        assert_eq!(
            variance_normalization_filter(&image, kernel_size, 1.0, 1.0),
            expected
        );
        assert!(matches!(
            lowpass_filter(&image, 13, 1.0),
            Err(FilterError::InsufficientPadding { kernel_size: 13, .. })
        ));
        assert_eq!(lowpass_filter(&image, 11, 1.0)?.size(), image.size());
        Ok(())
    }

    #[test]
    fn test_integer_variance_keeps_display_range() -> Result<(), FilterError> {
        let image = particles(21, 15);
        let max_in = max_value(&image).unwrap_or(0);

        let out = variance_normalization_filter(&image, 5, 1.0, 2.0)?;
        assert_eq!(max_value(&out), Some(max_in));

        let floats = image.map(|&v| v as f32);
        let raw = variance_normalization_filter(&floats, 5, 1.0, 2.0)?;
        assert!(raw.as_slice().iter().any(|&v| v < 0.0));
        Ok(())
    }
}
