//! # IAAFT Surrogates
//!
//! Surrogate time series by the Iterative Amplitude Adjusted Fourier
//! Transform (Schreiber & Schmitz, 1996).
//!
//! An IAAFT surrogate has the same value distribution as the original series
//! and (approximately) the same amplitude spectrum, but its temporal
//! structure beyond linear correlations is randomized. Comparing a
//! nonlinearity statistic on the original against its distribution over many
//! surrogates gives a test of the linear Gaussian null hypothesis.
//!
//! ## Quick Start
//!
//! ```rust
//! use iaaft_surrogates::{generate_surrogates, SurrogateConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let series: Vec<f64> = (0..256)
//!         .map(|i| (i as f64 * 0.2).sin() + 0.3 * (i as f64 * 0.05).cos())
//!         .collect();
//!
//!     let config = SurrogateConfig::default()
//!         .with_surrogate_count(10)
//!         .with_seed(42);
//!     let surrogates = generate_surrogates(&series, &config)?;
//!
//!     for (column, diag) in surrogates.columns().zip(surrogates.diagnostics()) {
//!         println!(
//!             "surrogate {}: {} values, {:?} after {} iterations",
//!             diag.index,
//!             column.len(),
//!             diag.status,
//!             diag.iterations
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`preprocessing`]: validation and optional endpoint detrending
//! - [`iaaft`]: targets, the spectrum and distribution projections, the
//!   convergence check and the per-surrogate loop
//! - [`generator`]: batch orchestration, sequential or on the rayon pool
//! - [`results`]: the N x M surrogate matrix and per-surrogate diagnostics
//! - [`fft_ops`]: cached `rustfft` plans
//! - [`secure_rng`]: per-surrogate ChaCha20 streams
//!
//! ## Features
//!
//! - `parallel` (default): generate surrogates concurrently with rayon
//! - `serde`: serialize configuration and results

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod generator;
pub mod iaaft;
pub mod preprocessing;
pub mod results;
pub mod secure_rng;

pub use config::{
    NonConvergencePolicy, SurrogateConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
pub use errors::{SurrogateError, SurrogateResult};
pub use generator::{generate_surrogates, generate_surrogates_with_cancellation};
pub use iaaft::{
    check_convergence, impose_distribution, impose_spectrum, initialize_working_sequence,
    rank_order, refine, run_surrogate, CancellationToken, ConvergenceCheck, SurrogateRun,
    SurrogateTargets,
};
pub use preprocessing::{prepare_series, EndpointTrend, PreparedSeries};
pub use results::{SurrogateCollection, SurrogateDiagnostics, SurrogateStatus};
pub use secure_rng::SecureRng;

pub use fft_ops::{
    amplitude_spectrum, clear_fft_cache, get_fft_cache_stats, relative_spectrum_error,
};
