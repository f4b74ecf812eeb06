use pivfilt_image::Image;

use crate::error::FilterError;
use crate::parallel::{for_each_row_mut, ExecutionStrategy};

use super::convolution::{valid_output_size, FloatConversion};
use super::kernels::Kernel;

/// Convolve a padded buffer with the separable factors of a Gaussian kernel.
///
/// Performs a horizontal pass over every padded row into an `f64` buffer,
/// followed by a vertical pass over that buffer. The result matches
/// [`super::convolve_direct`] up to floating point rounding.
///
/// See [`super::convolve`] for the output geometry.
///
/// # Arguments
///
/// * `padded` - The padded source buffer.
/// * `kernel` - The Gaussian kernel whose 1D factor is applied on both axes.
/// * `strategy` - The execution strategy for both passes.
pub fn convolve_separable<T: FloatConversion>(
    padded: &Image<T>,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<Image<T>, FilterError> {
    let out_size = valid_output_size(padded.size(), kernel.size())?;

    let k = kernel.size();
    let weights = kernel.weights_1d();
    let src_cols = padded.cols();
    let src_data = padded.as_slice();
    let out_cols = out_size.width;

    // Horizontal: every padded row, valid columns only
    let mut temp = vec![0.0f64; padded.rows() * out_cols];
    for_each_row_mut(strategy, &mut temp, out_cols, |r, temp_row| {
        let src_row = &src_data[r * src_cols..(r + 1) * src_cols];
        for (x, acc_out) in temp_row.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for (&w, v) in weights.iter().zip(src_row[x..x + k].iter()) {
                acc += w * v.as_f64();
            }
            *acc_out = acc;
        }
    })?;

    // Vertical
    let mut dst = Image::from_size_val(out_size, T::zero())?;
    let temp = &temp;
    for_each_row_mut(strategy, dst.as_slice_mut(), out_cols, |y, dst_row| {
        for (x, out) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for (i, &w) in weights.iter().enumerate() {
                acc += w * temp[(y + i) * out_cols + x];
            }
            *out = T::from_f64(acc);
        }
    })?;

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::convolve_direct;
    use approx::assert_relative_eq;
    use pivfilt_image::ImageSize;

    #[test]
    fn test_separable_impulse() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };

        #[rustfmt::skip]
        let img = Image::new(
            size,
            vec![
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ],
        )?;

        let kernel = Kernel::gaussian(3, 1.0)?;
        let dst = convolve_separable(&img, &kernel, ExecutionStrategy::Serial)?;

        assert_eq!(dst.size(), ImageSize { width: 3, height: 3 });
        assert_relative_eq!(dst.as_slice().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            dst.get([1, 1]).copied().unwrap_or(f64::NAN),
            kernel.center_weight(),
            max_relative = 1e-12
        );

        Ok(())
    }

    #[test]
    fn test_separable_matches_direct() -> Result<(), FilterError> {
        let img = Image::from_fn(ImageSize { width: 23, height: 17 }, |y, x| {
            ((y * 31 + x * 7) % 11) as f32 / 11.0
        });

        for (kernel_size, sigma) in [(1, 1.0), (3, 0.5), (5, 1.0), (7, 2.5), (9, 4.0)] {
            let kernel = Kernel::gaussian(kernel_size, sigma)?;
            let sep = convolve_separable(&img, &kernel, ExecutionStrategy::Serial)?;
            let direct = convolve_direct(&img, &kernel, ExecutionStrategy::Serial)?;

            assert_eq!(sep.size(), direct.size());
            for (a, b) in sep.as_slice().iter().zip(direct.as_slice().iter()) {
                assert_relative_eq!(*a, *b, max_relative = 1e-4, epsilon = 1e-6);
            }
        }

        Ok(())
    }
}
