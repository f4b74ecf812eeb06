use crate::error::FilterError;

/// Check that `kernel_size` and `sigma` describe a valid Gaussian kernel.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if `kernel_size` is zero or even,
/// or if `sigma` is not a finite value greater than zero.
pub fn validate_gaussian_params(kernel_size: usize, sigma: f32) -> Result<(), FilterError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(FilterError::InvalidParameter(format!(
            "kernel size must be a positive odd integer, got {kernel_size}"
        )));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(FilterError::InvalidParameter(format!(
            "sigma must be a finite value > 0, got {sigma}"
        )));
    }
    Ok(())
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mean = (kernel_size as f64 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;

    // compute the kernel
    let mut kernel = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - mean;
            (-(x * x) / denom).exp()
        })
        .collect::<Vec<_>>();

    // normalize the kernel
    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create an isotropic 2D gaussian kernel.
///
/// The weight at offset `(dx, dy)` from the center is `exp(-(dx² + dy²) / (2σ²))`
/// before normalization.
///
/// # Arguments
///
/// * `kernel_size` - The side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// The row-major `kernel_size * kernel_size` weights, normalized to sum to one.
pub fn gaussian_kernel_2d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mean = (kernel_size as f64 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;

    let mut kernel = Vec::with_capacity(kernel_size * kernel_size);
    for i in 0..kernel_size {
        let dy = i as f64 - mean;
        for j in 0..kernel_size {
            let dx = j as f64 - mean;
            kernel.push((-(dx * dx + dy * dy) / denom).exp());
        }
    }

    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// An immutable, normalized square Gaussian kernel.
///
/// Holds both the full 2D weights, used by direct convolution, and the 1D
/// factor, used by the separable row and column passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights_1d: Vec<f64>,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a normalized Gaussian kernel.
    ///
    /// `kernel_size == 1` yields the identity kernel `[[1.0]]` for any sigma.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] for an even or zero size or a
    /// non-positive sigma.
    ///
    /// # Example
    ///
    /// ```
    /// use pivfilt_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::gaussian(3, 1.0).unwrap();
    ///
    /// assert_eq!(kernel.size(), 3);
    /// assert_eq!(kernel.radius(), 1);
    /// assert!((kernel.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    /// ```
    pub fn gaussian(kernel_size: usize, sigma: f32) -> Result<Self, FilterError> {
        validate_gaussian_params(kernel_size, sigma)?;

        let sigma_f64 = sigma as f64;
        Ok(Self {
            size: kernel_size,
            weights_1d: gaussian_kernel_1d(kernel_size, sigma_f64),
            weights: gaussian_kernel_2d(kernel_size, sigma_f64),
        })
    }

    /// Side length `k = 2r + 1`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half-width `r`.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Row-major 2D weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The 1D factor whose outer product with itself is the 2D kernel.
    pub fn weights_1d(&self) -> &[f64] {
        &self.weights_1d
    }

    /// Weight at kernel row `i`, column `j`.
    pub fn weight(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.weights.get(i * self.size + j).copied()
    }

    /// Weight at the kernel center.
    pub fn center_weight(&self) -> f64 {
        let r = self.radius();
        self.weights[r * self.size + r]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (&k, &e) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(k, e, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_kernel_sums_to_one() -> Result<(), FilterError> {
        for kernel_size in [1, 3, 5, 7, 9, 11, 17, 31] {
            for sigma in [0.1, 0.5, 1.0, 2.0, 7.5, 100.0] {
                let kernel = Kernel::gaussian(kernel_size, sigma)?;
                assert_eq!(kernel.weights().len(), kernel_size * kernel_size);
                assert_relative_eq!(kernel.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-5);
                assert_relative_eq!(
                    kernel.weights_1d().iter().sum::<f64>(),
                    1.0,
                    epsilon = 1e-5
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_identity_kernel() -> Result<(), FilterError> {
        let kernel = Kernel::gaussian(1, 3.0)?;
        assert_eq!(kernel.weights(), &[1.0]);
        assert_eq!(kernel.weights_1d(), &[1.0]);
        assert_eq!(kernel.radius(), 0);
        Ok(())
    }

    #[test]
    fn test_kernel_symmetry_and_separability() -> Result<(), FilterError> {
        let kernel = Kernel::gaussian(5, 1.3)?;
        let w1 = kernel.weights_1d();
        for i in 0..5 {
            for j in 0..5 {
                let w = kernel.weight(i, j).unwrap_or(f64::NAN);
                assert_eq!(Some(w), kernel.weight(j, i));
                assert_eq!(Some(w), kernel.weight(4 - i, 4 - j));
                assert_relative_eq!(w, w1[i] * w1[j], max_relative = 1e-12);
            }
        }
        assert_eq!(kernel.weight(5, 0), None);
        assert!(kernel.center_weight() > kernel.weight(2, 3).unwrap_or(f64::INFINITY));
        Ok(())
    }

    #[test]
    fn test_kernel_deterministic() -> Result<(), FilterError> {
        let a = Kernel::gaussian(9, 1.7)?;
        let b = Kernel::gaussian(9, 1.7)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_invalid_kernel_params() {
        for kernel_size in [0, 2, 4, 10] {
            assert!(matches!(
                Kernel::gaussian(kernel_size, 1.0),
                Err(FilterError::InvalidParameter(_))
            ));
        }
        for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                Kernel::gaussian(3, sigma),
                Err(FilterError::InvalidParameter(_))
            ));
        }
    }
}
