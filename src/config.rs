//! # Surrogate Generation Configuration
//!
//! Controls how many surrogates are generated, how the input is prepared and
//! how the refinement loop stops.

use crate::errors::{validate_parameter, SurrogateError, SurrogateResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative-energy threshold below which successive passes are considered unchanged.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default cap on refinement passes per surrogate.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// What to do with surrogates that end without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NonConvergencePolicy {
    /// Emit the last iterate and flag it in the diagnostics
    #[default]
    BestEffort,
    /// Finish every surrogate, then fail the batch if any did not converge
    Abort,
}

/// Configuration for a batch of IAAFT surrogates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurrogateConfig {
    /// Number of surrogates (output columns) to generate
    pub surrogate_count: usize,
    /// Remove the endpoint trend before computing the targets
    pub detrend: bool,
    /// Add the removed trend back to every emitted surrogate
    pub restore_trend: bool,
    /// Master seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
    /// Maximum refinement passes per surrogate
    pub max_iterations: usize,
    /// Convergence threshold on `sum((prev - cur)^2) / sum(cur^2)`
    pub tolerance: f64,
    /// Handling of non-converged and degenerate surrogates
    pub non_convergence_policy: NonConvergencePolicy,
    /// Run surrogates on the rayon pool when the `parallel` feature is enabled
    pub parallel: bool,
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            surrogate_count: 1,
            detrend: false,
            restore_trend: false,
            seed: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            non_convergence_policy: NonConvergencePolicy::BestEffort,
            parallel: true,
        }
    }
}

impl SurrogateConfig {
    /// Quick configuration: looser threshold and a short iteration cap
    pub fn quick() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            ..Self::default()
        }
    }

    /// Precise configuration: tight threshold, generous cap, abort on failure
    pub fn precise() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
            non_convergence_policy: NonConvergencePolicy::Abort,
            ..Self::default()
        }
    }

    /// Set the number of surrogates
    pub fn with_surrogate_count(mut self, surrogate_count: usize) -> Self {
        self.surrogate_count = surrogate_count;
        self
    }

    /// Enable or disable endpoint detrending
    pub fn with_detrend(mut self, detrend: bool) -> Self {
        self.detrend = detrend;
        self
    }

    /// Enable or disable restoring the trend on the output
    pub fn with_restore_trend(mut self, restore_trend: bool) -> Self {
        self.restore_trend = restore_trend;
        self
    }

    /// Fix the master seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the non-convergence policy
    pub fn with_policy(mut self, policy: NonConvergencePolicy) -> Self {
        self.non_convergence_policy = policy;
        self
    }

    /// Enable or disable parallel execution
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check every field before any computation starts.
    pub fn validate(&self) -> SurrogateResult<()> {
        if self.surrogate_count == 0 {
            return Err(SurrogateError::InvalidParameter {
                parameter: "surrogate_count".to_string(),
                value: 0.0,
                constraint: "must be greater than 0".to_string(),
            });
        }

        if self.max_iterations == 0 {
            return Err(SurrogateError::InvalidParameter {
                parameter: "max_iterations".to_string(),
                value: 0.0,
                constraint: "must be greater than 0".to_string(),
            });
        }

        validate_parameter(self.tolerance, f64::MIN_POSITIVE, f64::MAX, "tolerance")?;

        if self.restore_trend && !self.detrend {
            log::warn!("restore_trend has no effect without detrend");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SurrogateConfig::default();
        assert_eq!(config.surrogate_count, 1);
        assert!(!config.detrend);
        assert!(!config.restore_trend);
        assert_eq!(config.seed, None);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.non_convergence_policy, NonConvergencePolicy::BestEffort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SurrogateConfig::quick().validate().is_ok());
        let precise = SurrogateConfig::precise();
        assert!(precise.validate().is_ok());
        assert_eq!(precise.non_convergence_policy, NonConvergencePolicy::Abort);
    }

    #[test]
    fn test_builder_methods() {
        let config = SurrogateConfig::default()
            .with_surrogate_count(5)
            .with_detrend(true)
            .with_restore_trend(true)
            .with_seed(7)
            .with_max_iterations(50)
            .with_tolerance(1e-8)
            .with_policy(NonConvergencePolicy::Abort)
            .with_parallel(false);

        assert_eq!(config.surrogate_count, 5);
        assert!(config.detrend && config.restore_trend);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.tolerance, 1e-8);
        assert!(!config.parallel);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_count = SurrogateConfig::default().with_surrogate_count(0);
        match zero_count.validate() {
            Err(SurrogateError::InvalidParameter { parameter, .. }) => {
                assert_eq!(parameter, "surrogate_count")
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }

        let zero_iterations = SurrogateConfig::default().with_max_iterations(0);
        match zero_iterations.validate() {
            Err(SurrogateError::InvalidParameter { parameter, .. }) => {
                assert_eq!(parameter, "max_iterations")
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }

        for tolerance in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let config = SurrogateConfig::default().with_tolerance(tolerance);
            assert!(config.validate().is_err(), "tolerance {} accepted", tolerance);
        }
    }
}
