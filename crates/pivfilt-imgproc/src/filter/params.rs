use crate::error::FilterError;
use crate::padding::PaddingMode;

use super::kernels::validate_gaussian_params;

/// Default stabilizer added to the local variance before the square root.
pub const DEFAULT_EPSILON: f32 = 1e-6;

/// Parameters of the Gaussian lowpass filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LowpassParams {
    /// Odd side length of the kernel.
    pub kernel_size: usize,
    /// Spread of the Gaussian.
    pub sigma: f32,
}

impl Default for LowpassParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            sigma: 1.0,
        }
    }
}

impl LowpassParams {
    /// Check the parameters without touching any buffer.
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_gaussian_params(self.kernel_size, self.sigma)
    }
}

/// Parameters of the Gaussian highpass filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HighpassParams {
    /// Odd side length of the kernel.
    pub kernel_size: usize,
    /// Spread of the Gaussian that estimates the background.
    pub sigma: f32,
    /// Set negative responses to zero, keeping only bright detail.
    pub clip_at_zero: bool,
}

impl Default for HighpassParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            sigma: 1.0,
            clip_at_zero: false,
        }
    }
}

impl HighpassParams {
    /// Check the parameters without touching any buffer.
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_gaussian_params(self.kernel_size, self.sigma)
    }
}

/// Range of the variance normalized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutputRange {
    /// The local z-score itself.
    #[default]
    Raw,
    /// The z-score divided by its maximum, when that maximum is positive.
    MaxNormalized,
}

/// Parameters of the local variance normalization filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VarianceNormParams {
    /// Odd side length of both kernels.
    pub kernel_size: usize,
    /// Spread of the Gaussian estimating the local mean.
    pub sigma1: f32,
    /// Spread of the Gaussian estimating the local variance.
    pub sigma2: f32,
    /// Added to the local variance before the square root.
    pub epsilon: f32,
    /// Border policy used to re-pad the squared deviation field.
    pub repad_mode: PaddingMode,
    /// Range of the result.
    pub output_range: OutputRange,
}

impl Default for VarianceNormParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            sigma1: 2.0,
            sigma2: 2.0,
            epsilon: DEFAULT_EPSILON,
            repad_mode: PaddingMode::Reflect101,
            output_range: OutputRange::Raw,
        }
    }
}

impl VarianceNormParams {
    /// Parameters with the given kernel and spreads and default policies.
    pub fn new(kernel_size: usize, sigma1: f32, sigma2: f32) -> Self {
        Self {
            kernel_size,
            sigma1,
            sigma2,
            ..Default::default()
        }
    }

    /// Check the parameters without touching any buffer.
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_gaussian_params(self.kernel_size, self.sigma1)?;
        validate_gaussian_params(self.kernel_size, self.sigma2)?;
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(FilterError::InvalidParameter(format!(
                "epsilon must be a finite value > 0, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// One of the three filters together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "filter", rename_all = "snake_case"))]
pub enum FilterKind {
    /// Gaussian blur.
    Lowpass(LowpassParams),
    /// Input minus its Gaussian blur.
    Highpass(HighpassParams),
    /// Local z-score normalization.
    VarianceNormalization(VarianceNormParams),
}

impl FilterKind {
    /// Short name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Lowpass(_) => "lowpass",
            FilterKind::Highpass(_) => "highpass",
            FilterKind::VarianceNormalization(_) => "variance_normalization",
        }
    }

    /// Side length of the kernel the filter uses.
    pub fn kernel_size(&self) -> usize {
        match self {
            FilterKind::Lowpass(p) => p.kernel_size,
            FilterKind::Highpass(p) => p.kernel_size,
            FilterKind::VarianceNormalization(p) => p.kernel_size,
        }
    }

    /// Check the parameters without touching any buffer.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            FilterKind::Lowpass(p) => p.validate(),
            FilterKind::Highpass(p) => p.validate(),
            FilterKind::VarianceNormalization(p) => p.validate(),
        }
    }
}
