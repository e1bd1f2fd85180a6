//! Engine configuration.
//!
//! Settings that shape how a run is executed and reported but not what is
//! being priced. [`SimulationParameters`](crate::params::SimulationParameters)
//! describes the contract and the market; [`EngineConfig`] describes the
//! estimator.

use super::batch::default_block_size;
use crate::error::PricingError;
use crate::estimator::ConfidenceLevel;

/// How the running extrema of a path are observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PathScheme {
    /// Extrema over the simulated grid points only.
    #[default]
    LogEuler,
    /// Extrema sampled exactly within each step from the Brownian bridge
    /// between grid points.
    Bridge,
}

/// Monte Carlo engine configuration.
///
/// Use [`EngineConfig::builder`] to construct non-default instances.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::estimator::ConfidenceLevel;
/// use pricer_lookback::mc::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .confidence(ConfidenceLevel::P99)
///     .antithetic(true)
///     .block_size(1024)
///     .build()
///     .expect("valid configuration");
///
/// assert!(config.antithetic());
/// assert_eq!(config.block_size_for(100_000), 1024);
/// assert_eq!(EngineConfig::default().block_size_for(100_000), 25);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Confidence level of the reported bounds.
    confidence: ConfidenceLevel,
    /// Pair each path with its mirror image.
    antithetic: bool,
    /// Extremum observation.
    scheme: PathScheme,
    /// Paths per accumulation block; derived from the path count when unset.
    block_size: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceLevel::default(),
            antithetic: false,
            scheme: PathScheme::default(),
            block_size: None,
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Returns the confidence level.
    #[inline]
    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }

    /// Returns true if antithetic sampling is enabled.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Returns the extremum observation scheme.
    #[inline]
    pub fn scheme(&self) -> PathScheme {
        self.scheme
    }

    /// Returns the explicit block size, if one was set.
    #[inline]
    pub fn block_size(&self) -> Option<usize> {
        self.block_size
    }

    /// Block size used for a run of `n_paths` paths.
    ///
    /// Block boundaries fix the floating-point summation order. They depend
    /// on the path count and this configuration only, never on the worker
    /// count.
    #[inline]
    pub fn block_size_for(&self, n_paths: usize) -> usize {
        self.block_size.unwrap_or_else(|| default_block_size(n_paths))
    }
}

/// Builder for [`EngineConfig`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    confidence: Option<ConfidenceLevel>,
    antithetic: bool,
    scheme: PathScheme,
    block_size: Option<usize>,
}

impl EngineConfigBuilder {
    /// Sets the confidence level.
    #[inline]
    pub fn confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Enables or disables antithetic sampling.
    #[inline]
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Sets the extremum observation scheme.
    #[inline]
    pub fn scheme(mut self, scheme: PathScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Overrides the accumulation block size.
    #[inline]
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the block size is zero.
    pub fn build(self) -> Result<EngineConfig, PricingError> {
        if self.block_size == Some(0) {
            return Err(PricingError::invalid("block_size", "must be at least 1"));
        }
        Ok(EngineConfig {
            confidence: self.confidence.unwrap_or_default(),
            antithetic: self.antithetic,
            scheme: self.scheme,
            block_size: self.block_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.confidence(), ConfidenceLevel::P95);
        assert!(!config.antithetic());
        assert_eq!(config.scheme(), PathScheme::LogEuler);
        assert_eq!(config.block_size(), None);
        assert_eq!(EngineConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn test_block_size_follows_path_count() {
        let config = EngineConfig::default();
        assert_eq!(config.block_size_for(1_000), 1);
        assert_eq!(config.block_size_for(1_000_000), 245);

        let fixed = EngineConfig::builder().block_size(64).build().unwrap();
        assert_eq!(fixed.block_size_for(1_000), 64);
        assert_eq!(fixed.block_size_for(1_000_000), 64);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(matches!(
            EngineConfig::builder().block_size(0).build(),
            Err(PricingError::InvalidParameter {
                name: "block_size",
                ..
            })
        ));
    }
}
