//! Batch generation of IAAFT surrogates.
//!
//! Targets are computed once and shared read-only; each surrogate then runs
//! independently with its own random stream. Stream seeds depend only on the
//! master seed and the column index, so the parallel and sequential paths
//! produce identical collections.

use crate::config::{NonConvergencePolicy, SurrogateConfig};
use crate::errors::{validate_allocation_size, SurrogateError, SurrogateResult};
use crate::iaaft::{run_surrogate, CancellationToken, SurrogateRun, SurrogateTargets};
use crate::preprocessing::prepare_series;
use crate::results::{SurrogateCollection, SurrogateStatus};
use crate::secure_rng::{entropy_seed, SecureRng};

/// Generate `config.surrogate_count` IAAFT surrogates of `data`.
///
/// # Example
///
/// ```rust
/// use iaaft_surrogates::{generate_surrogates, SurrogateConfig};
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
/// let config = SurrogateConfig::default().with_surrogate_count(3).with_seed(7);
///
/// let surrogates = generate_surrogates(&data, &config).unwrap();
/// assert_eq!(surrogates.shape(), (8, 3));
///
/// let mut values = surrogates.column(0).to_vec();
/// values.sort_by(f64::total_cmp);
/// assert_eq!(values, vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0]);
/// ```
pub fn generate_surrogates(
    data: &[f64],
    config: &SurrogateConfig,
) -> SurrogateResult<SurrogateCollection> {
    generate_surrogates_with_cancellation(data, config, None)
}

/// Same as [`generate_surrogates`], stopping early once `cancel` is set.
///
/// A cancelled batch returns [`SurrogateError::Cancelled`] and no columns.
pub fn generate_surrogates_with_cancellation(
    data: &[f64],
    config: &SurrogateConfig,
    cancel: Option<&CancellationToken>,
) -> SurrogateResult<SurrogateCollection> {
    config.validate()?;
    let prepared = prepare_series(data, config.detrend)?;

    let n = prepared.values.len();
    let total = config.surrogate_count;
    let bytes = n
        .checked_mul(total)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
        .unwrap_or(usize::MAX);
    validate_allocation_size(bytes, "surrogate collection")?;

    let targets = SurrogateTargets::from_series(&prepared.values)?;
    let master_seed = config.seed.unwrap_or_else(entropy_seed);

    log::info!(
        "Starting IAAFT generation: {} surrogate(s) of length {} (master seed {})",
        total,
        n,
        master_seed
    );

    let runs = run_batch(total, config.parallel, |index| {
        let mut rng = SecureRng::for_stream(master_seed, index);
        run_surrogate(&targets, &mut rng, config, cancel)
    });

    let mut columns = Vec::with_capacity(total);
    let mut diagnostics = Vec::with_capacity(total);
    let mut cancelled = false;

    for (index, run) in runs.into_iter().enumerate() {
        let Some(SurrogateRun {
            mut values,
            diagnostics: mut diag,
        }) = run?
        else {
            cancelled = true;
            continue;
        };

        diag.index = index;
        match diag.status {
            SurrogateStatus::Converged => log::debug!(
                "Surrogate {} of {} converged after {} iterations",
                index + 1,
                total,
                diag.iterations
            ),
            SurrogateStatus::MaxIterationsReached => log::warn!(
                "Surrogate {} of {} did not converge within {} iterations (relative change {:?})",
                index + 1,
                total,
                diag.iterations,
                diag.relative_energy
            ),
            SurrogateStatus::Degenerate => log::warn!(
                "Surrogate {} of {} is degenerate: iterate energy is numerically zero",
                index + 1,
                total
            ),
        }

        if config.restore_trend {
            if let Some(trend) = prepared.trend {
                trend.restore(&mut values);
            }
        }

        columns.push(values);
        diagnostics.push(diag);
    }

    if cancelled {
        log::info!(
            "IAAFT generation cancelled with {} of {} surrogates finished",
            columns.len(),
            total
        );
        return Err(SurrogateError::Cancelled {
            completed: columns.len(),
            total,
        });
    }

    let collection = SurrogateCollection::from_columns(columns, diagnostics, master_seed)?;

    let failed = collection.non_converged();
    if !failed.is_empty() && config.non_convergence_policy == NonConvergencePolicy::Abort {
        return Err(SurrogateError::ConvergenceFailure { failed, total });
    }

    log::info!(
        "Finished IAAFT generation: {} of {} surrogates converged",
        total - failed.len(),
        total
    );

    Ok(collection)
}

/// Run `f` for every index in `0..count`, in parallel when requested.
#[cfg(feature = "parallel")]
fn run_batch<R, F>(count: usize, parallel: bool, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    use rayon::prelude::*;

    if parallel {
        (0..count).into_par_iter().map(f).collect()
    } else {
        (0..count).map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_batch<R, F>(count: usize, _parallel: bool, f: F) -> Vec<R>
where
    F: Fn(usize) -> R,
{
    (0..count).map(f).collect()
}
