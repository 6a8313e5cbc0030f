//! Builder for validating and constructing [`GenerationConfig`] values.

use crate::error::{GraphWfcError, Result};

/// Validated parameters for a single [`crate::Generator::run`] invocation.
///
/// # Examples
/// ```
/// use graphwfc_core::GenerationConfigBuilder;
///
/// let config = GenerationConfigBuilder::new()
///     .with_radius(2)
///     .with_size_factor(3)
///     .with_rng_seed(42)
///     .build()
///     .expect("default bounds are valid");
/// assert_eq!(config.radius(), 2);
/// assert_eq!(config.size_factor(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    radius: usize,
    size_factor: usize,
    lower_cap: f64,
    upper_cap: f64,
    expansion_percentile: f64,
    expansion_slack: f64,
    rng_seed: u64,
}

impl GenerationConfig {
    /// Ego-network radius used for pattern extraction and compatibility.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Output size as a multiple of the training graph's node count.
    #[must_use]
    pub fn size_factor(&self) -> usize {
        self.size_factor
    }

    /// Fraction of `target_size` at which the growth loop may terminate.
    #[must_use]
    pub fn lower_cap(&self) -> f64 {
        self.lower_cap
    }

    /// Multiple of `target_size` the cleanup loop must not exceed.
    #[must_use]
    pub fn upper_cap(&self) -> f64 {
        self.upper_cap
    }

    /// Percentile of the training degree sequence used to derive
    /// `expansion_cap`.
    #[must_use]
    pub fn expansion_percentile(&self) -> f64 {
        self.expansion_percentile
    }

    /// Slack multiplier applied on top of `expansion_percentile`.
    #[must_use]
    pub fn expansion_slack(&self) -> f64 {
        self.expansion_slack
    }

    /// Seed for the single RNG that drives every weighted-sampling decision.
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Derived output size target: `size_factor * training_node_count`.
    #[must_use]
    pub fn target_size(&self, training_node_count: usize) -> usize {
        self.size_factor * training_node_count
    }

    /// Derived hard upper bound on `|settled|`:
    /// `ceil(target_size * upper_cap)`.
    #[must_use]
    pub fn hard_upper(&self, training_node_count: usize) -> usize {
        let target = self.target_size(training_node_count) as f64;
        (target * self.upper_cap).ceil() as usize
    }
}

/// Builds a [`GenerationConfig`], applying the defaults named in the
/// configuration enumeration (`expansion_percentile = 0.9`,
/// `expansion_slack = 1.1`).
///
/// # Examples
/// ```
/// use graphwfc_core::GenerationConfigBuilder;
///
/// let builder = GenerationConfigBuilder::new().with_radius(1);
/// assert_eq!(builder.build().unwrap().expansion_percentile(), 0.9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfigBuilder {
    radius: usize,
    size_factor: usize,
    lower_cap: f64,
    upper_cap: f64,
    expansion_percentile: f64,
    expansion_slack: f64,
    rng_seed: u64,
}

impl Default for GenerationConfigBuilder {
    fn default() -> Self {
        Self {
            radius: 1,
            size_factor: 1,
            lower_cap: 0.9,
            upper_cap: 1.1,
            expansion_percentile: 0.9,
            expansion_slack: 1.1,
            rng_seed: 0,
        }
    }
}

impl GenerationConfigBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ego-network radius.
    #[must_use]
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the output-size multiplier.
    #[must_use]
    pub fn with_size_factor(mut self, size_factor: usize) -> Self {
        self.size_factor = size_factor;
        self
    }

    /// Sets the growth-loop termination fraction.
    #[must_use]
    pub fn with_lower_cap(mut self, lower_cap: f64) -> Self {
        self.lower_cap = lower_cap;
        self
    }

    /// Sets the cleanup-loop hard-stop multiplier.
    #[must_use]
    pub fn with_upper_cap(mut self, upper_cap: f64) -> Self {
        self.upper_cap = upper_cap;
        self
    }

    /// Sets the training-degree percentile used to derive `expansion_cap`.
    #[must_use]
    pub fn with_expansion_percentile(mut self, expansion_percentile: f64) -> Self {
        self.expansion_percentile = expansion_percentile;
        self
    }

    /// Sets the slack multiplier applied to `expansion_percentile`.
    #[must_use]
    pub fn with_expansion_slack(mut self, expansion_slack: f64) -> Self {
        self.expansion_slack = expansion_slack;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Validates the configuration and constructs a [`GenerationConfig`].
    ///
    /// # Errors
    /// Returns the matching `Invalid*` [`GraphWfcError`] variant for the
    /// first out-of-range field encountered, checked in field-declaration
    /// order.
    pub fn build(self) -> Result<GenerationConfig> {
        if self.radius < 1 {
            return Err(GraphWfcError::InvalidRadius { got: self.radius });
        }
        if self.size_factor < 1 {
            return Err(GraphWfcError::InvalidSizeFactor {
                got: self.size_factor,
            });
        }
        if self.lower_cap <= 0.0 || self.lower_cap > 1.0 {
            return Err(GraphWfcError::InvalidLowerCap {
                got: self.lower_cap,
            });
        }
        if self.upper_cap < 1.0 {
            return Err(GraphWfcError::InvalidUpperCap {
                got: self.upper_cap,
            });
        }
        if !(0.0..=1.0).contains(&self.expansion_percentile) {
            return Err(GraphWfcError::InvalidExpansionPercentile {
                got: self.expansion_percentile,
            });
        }
        if self.expansion_slack < 1.0 {
            return Err(GraphWfcError::InvalidExpansionSlack {
                got: self.expansion_slack,
            });
        }

        Ok(GenerationConfig {
            radius: self.radius,
            size_factor: self.size_factor,
            lower_cap: self.lower_cap,
            upper_cap: self.upper_cap,
            expansion_percentile: self.expansion_percentile,
            expansion_slack: self.expansion_slack,
            rng_seed: self.rng_seed,
        })
    }
}
