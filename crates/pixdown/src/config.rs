use std::path::Path;

use num_traits::Float;
use pixdown_imgproc::{
    downsample::KernelApplyParams, parallel::ExecutionStrategy, DownsampleError,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration of a [`crate::Downsampler`].
///
/// Missing fields take their default value when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsamplerConfig {
    /// Integer downsampling factor.
    pub scale: usize,
    /// Side length of the sampling neighborhood.
    pub kernel_size: usize,
    /// Sharpness of the soft rounding step.
    pub alpha: f32,
    /// How the per-pixel loops are scheduled.
    pub strategy: ExecutionStrategy,
    /// When set, reject kernels whose weights deviate from a unit sum by more than this.
    pub kernel_sum_tolerance: Option<f32>,
}

impl Default for DownsamplerConfig {
    fn default() -> Self {
        Self {
            scale: 2,
            kernel_size: 3,
            alpha: 1.0,
            strategy: ExecutionStrategy::Serial,
            kernel_sum_tolerance: None,
        }
    }
}

impl DownsamplerConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// use pixdown::DownsamplerConfig;
    ///
    /// let config = DownsamplerConfig::from_json_str(r#"{ "scale": 4 }"#).unwrap();
    /// assert_eq!(config.scale, 4);
    /// assert_eq!(config.kernel_size, 3);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("loading downsampler config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every value is in its valid range.
    pub fn validate(&self) -> Result<(), DownsampleError> {
        self.to_params::<f32>()?.validate()
    }

    /// Convert to the operator parameters for the floating point type `F`.
    pub fn to_params<F: Float>(&self) -> Result<KernelApplyParams<F>, DownsampleError> {
        let to_float = |name: &'static str, value: f32| {
            F::from(value).ok_or_else(|| DownsampleError::InvalidParameter {
                name,
                value: value.to_string(),
            })
        };

        Ok(KernelApplyParams {
            scale: self.scale,
            kernel_size: self.kernel_size,
            alpha: to_float("alpha", self.alpha)?,
            strategy: self.strategy,
            kernel_sum_tolerance: self
                .kernel_sum_tolerance
                .map(|t| to_float("kernel_sum_tolerance", t))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = DownsamplerConfig::default();
        assert_eq!(config.scale, 2);
        assert_eq!(config.kernel_size, 3);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.strategy, ExecutionStrategy::Serial);
        assert_eq!(config.kernel_sum_tolerance, None);
    }

    #[test]
    fn json_overrides() -> Result<(), ConfigError> {
        let config = DownsamplerConfig::from_json_str(
            r#"{
                "kernel_size": 5,
                "alpha": 0.5,
                "strategy": "parallel_elements",
                "kernel_sum_tolerance": 0.01
            }"#,
        )?;
        assert_eq!(config.scale, 2);
        assert_eq!(config.kernel_size, 5);
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.strategy, ExecutionStrategy::ParallelElements);
        assert_eq!(config.kernel_sum_tolerance, Some(0.01));
        Ok(())
    }

    #[test]
    fn empty_json_is_default() -> Result<(), ConfigError> {
        assert_eq!(
            DownsamplerConfig::from_json_str("{}")?,
            DownsamplerConfig::default()
        );
        Ok(())
    }

    #[test]
    fn invalid_values() {
        let res = DownsamplerConfig::from_json_str(r#"{ "scale": 0 }"#);
        assert!(matches!(
            res,
            Err(ConfigError::Downsample(DownsampleError::InvalidParameter {
                name: "scale",
                ..
            }))
        ));

        let res = DownsamplerConfig::from_json_str(r#"{ "kernel_sum_tolerance": -1.0 }"#);
        assert!(matches!(res, Err(ConfigError::Downsample(_))));

        let res = DownsamplerConfig::from_json_str(r#"{ "strategy": "gpu" }"#);
        assert!(matches!(res, Err(ConfigError::Json(_))));
    }

    #[test]
    fn from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "scale": 3, "kernel_size": 1 }}"#)?;

        let config = DownsamplerConfig::from_json_file(file.path())?;
        assert_eq!(config.scale, 3);
        assert_eq!(config.kernel_size, 1);

        let missing = DownsamplerConfig::from_json_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
        Ok(())
    }
}
