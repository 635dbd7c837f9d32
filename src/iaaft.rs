//! Iterative Amplitude Adjusted Fourier Transform (IAAFT) refinement.
//!
//! Schreiber & Schmitz, Phys. Rev. Lett. 77 (1996), 635.
//!
//! A surrogate starts as a random permutation of the original values and is
//! refined by alternating two projections:
//!
//! 1. **Spectrum**: keep the current Fourier phases, replace every amplitude
//!    with the original's, and transform back.
//! 2. **Distribution**: keep the current rank order, replace every value with
//!    the original's order statistic of the same rank.
//!
//! The loop stops once a full pass no longer changes the sequence
//! appreciably. Because the distribution projection runs last, every emitted
//! surrogate is an exact permutation of the (prepared) original values; its
//! amplitude spectrum matches the original's only approximately.

use crate::config::SurrogateConfig;
use crate::errors::{validate_all_finite, validate_data_length, SurrogateError, SurrogateResult};
use crate::fft_ops::{amplitude_spectrum, forward_fft, inverse_fft_real, relative_spectrum_error};
use crate::preprocessing::MIN_SERIES_LENGTH;
use crate::results::{SurrogateDiagnostics, SurrogateStatus};
use crate::secure_rng::SecureRng;
use num_complex::Complex64;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Below this scaled energy the convergence ratio is not meaningful.
const MIN_ENERGY: f64 = f64::MIN_POSITIVE;

/// Targets shared read-only by every surrogate of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateTargets {
    series: Vec<f64>,
    amplitude: Vec<f64>,
    distribution: Vec<f64>,
}

impl SurrogateTargets {
    /// Compute the amplitude spectrum and sorted distribution of `series`.
    pub fn from_series(series: &[f64]) -> SurrogateResult<Self> {
        validate_data_length(series, MIN_SERIES_LENGTH)?;
        validate_all_finite(series, "target series")?;

        let amplitude = amplitude_spectrum(series)?;
        let mut distribution = series.to_vec();
        distribution.sort_by(f64::total_cmp);

        Ok(Self {
            series: series.to_vec(),
            amplitude,
            distribution,
        })
    }

    /// Sequence the targets were computed from.
    pub fn series(&self) -> &[f64] {
        &self.series
    }

    /// `|FFT(series)[k]|` for every bin.
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Series values sorted ascending.
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Sequence length.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always false for validated targets.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Cooperative cancellation flag shared between a caller and running surrogates.
///
/// Checked at the top of every refinement pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not yet cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every surrogate observing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of comparing two successive iterates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceCheck {
    /// Relative change at or below the tolerance
    Converged {
        /// `sum((prev - cur)^2) / sum(cur^2)`
        relative_energy: f64,
    },
    /// Relative change above the tolerance
    NotConverged {
        /// `sum((prev - cur)^2) / sum(cur^2)`
        relative_energy: f64,
    },
    /// Current iterate has (near) zero energy, so the ratio is undefined
    Degenerate,
}

impl ConvergenceCheck {
    /// True only for [`ConvergenceCheck::Converged`].
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Relative energy of the difference, if it was defined.
    pub fn relative_energy(&self) -> Option<f64> {
        match *self {
            Self::Converged { relative_energy } | Self::NotConverged { relative_energy } => {
                Some(relative_energy)
            }
            Self::Degenerate => None,
        }
    }
}

/// Compare the iterates before and after one full pass.
///
/// Converged when `sum((previous - current)^2) / sum(current^2) <= tolerance`.
///
/// Both sums are taken over values divided by the largest magnitude in
/// either iterate, so the ratio stays finite for any finite input.
pub fn check_convergence(previous: &[f64], current: &[f64], tolerance: f64) -> ConvergenceCheck {
    debug_assert_eq!(previous.len(), current.len());

    let scale = previous
        .iter()
        .chain(current)
        .fold(0.0_f64, |max, v| max.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return ConvergenceCheck::Degenerate;
    }

    let difference: f64 = previous
        .iter()
        .zip(current)
        .map(|(p, c)| (p / scale - c / scale).powi(2))
        .sum();
    let energy: f64 = current.iter().map(|c| (c / scale).powi(2)).sum();

    if energy < MIN_ENERGY {
        return ConvergenceCheck::Degenerate;
    }

    let relative_energy = difference / energy;
    if !relative_energy.is_finite() {
        ConvergenceCheck::Degenerate
    } else if relative_energy <= tolerance {
        ConvergenceCheck::Converged { relative_energy }
    } else {
        ConvergenceCheck::NotConverged { relative_energy }
    }
}

/// Uniformly random permutation of `series`.
pub fn initialize_working_sequence(series: &[f64], rng: &mut SecureRng) -> Vec<f64> {
    let mut working = series.to_vec();
    rng.shuffle(&mut working);
    working
}

/// Give `working` the target amplitude spectrum while keeping its phases.
pub fn impose_spectrum(working: &[f64], target_amplitude: &[f64]) -> SurrogateResult<Vec<f64>> {
    if working.len() != target_amplitude.len() {
        return Err(SurrogateError::LengthMismatch {
            context: "impose_spectrum".to_string(),
            expected: target_amplitude.len(),
            actual: working.len(),
        });
    }

    let spectrum = forward_fft(working)?;
    let adjusted: Vec<Complex64> = spectrum
        .iter()
        .zip(target_amplitude)
        .map(|(bin, &amplitude)| Complex64::from_polar(amplitude, bin.arg()))
        .collect();

    inverse_fft_real(adjusted)
}

/// Indices that sort `values` ascending.
///
/// Stable: equal values keep their positional order.
pub fn rank_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Replace each value by the target order statistic of the same rank.
pub fn impose_distribution(
    sequence: &[f64],
    target_distribution: &[f64],
) -> SurrogateResult<Vec<f64>> {
    if sequence.len() != target_distribution.len() {
        return Err(SurrogateError::LengthMismatch {
            context: "impose_distribution".to_string(),
            expected: target_distribution.len(),
            actual: sequence.len(),
        });
    }

    let mut result = vec![0.0; sequence.len()];
    for (rank, index) in rank_order(sequence).into_iter().enumerate() {
        result[index] = target_distribution[rank];
    }
    Ok(result)
}

/// One spectrum pass followed by one distribution pass.
pub fn refine(working: &[f64], targets: &SurrogateTargets) -> SurrogateResult<Vec<f64>> {
    let spectral = impose_spectrum(working, targets.amplitude())?;
    impose_distribution(&spectral, targets.distribution())
}

/// A finished surrogate and how it finished.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateRun {
    /// Final iterate
    pub values: Vec<f64>,
    /// Iteration count, terminal status and spectral error
    pub diagnostics: SurrogateDiagnostics,
}

/// Generate a single surrogate.
///
/// Returns `Ok(None)` when `cancel` is observed before the loop finishes;
/// the partial iterate is dropped.
pub fn run_surrogate(
    targets: &SurrogateTargets,
    rng: &mut SecureRng,
    config: &SurrogateConfig,
    cancel: Option<&CancellationToken>,
) -> SurrogateResult<Option<SurrogateRun>> {
    let mut current = initialize_working_sequence(targets.series(), rng);
    let mut iterations = 0;

    let (status, relative_energy) = loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Ok(None);
        }

        let previous = current;
        current = refine(&previous, targets)?;
        iterations += 1;

        match check_convergence(&previous, &current, config.tolerance) {
            ConvergenceCheck::Converged { relative_energy } => {
                break (SurrogateStatus::Converged, Some(relative_energy));
            }
            ConvergenceCheck::Degenerate => break (SurrogateStatus::Degenerate, None),
            ConvergenceCheck::NotConverged { relative_energy } => {
                if iterations >= config.max_iterations {
                    break (SurrogateStatus::MaxIterationsReached, Some(relative_energy));
                }
            }
        }
    };

    let achieved = amplitude_spectrum(&current)?;
    let spectrum_error = relative_spectrum_error(targets.amplitude(), &achieved)?;

    Ok(Some(SurrogateRun {
        values: current,
        diagnostics: SurrogateDiagnostics {
            index: 0,
            seed: rng.seed(),
            iterations,
            status,
            relative_energy,
            spectrum_error,
        },
    }))
}
