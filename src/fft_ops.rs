//! FFT primitives used by the surrogate generator.
//!
//! Planning an FFT is far more expensive than executing one, and the IAAFT
//! loop runs two transforms of the same length on every pass of every
//! surrogate. Plans are therefore cached process-wide, keyed by length and
//! direction, with LRU eviction.

use crate::errors::{SurrogateError, SurrogateResult};
use lru::LruCache;
use num_complex::Complex64;
use once_cell::sync::Lazy;
use rustfft::{Fft, FftPlanner};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Cache key for FFT planners, distinguishing forward and inverse transforms
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct FftCacheKey {
    size: usize,
    is_forward: bool,
}

type SharedFft = Arc<dyn Fft<f64> + Send + Sync>;
type FftPlanCache = LruCache<FftCacheKey, SharedFft>;

/// Maximum number of cached plans
const MAX_CACHE_ENTRIES: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => panic!("cache capacity must be non-zero"),
};
/// Maximum FFT size (2^24 points)
pub const MAX_FFT_SIZE: usize = 1 << 24;

static FFT_CACHE: Lazy<Mutex<FftPlanCache>> =
    Lazy::new(|| Mutex::new(LruCache::new(MAX_CACHE_ENTRIES)));

fn get_cached_fft_plan(size: usize, is_forward: bool) -> SurrogateResult<SharedFft> {
    if size == 0 || size > MAX_FFT_SIZE {
        return Err(SurrogateError::FftError { size });
    }

    let cache_key = FftCacheKey { size, is_forward };

    // A poisoned lock only means another thread panicked mid-insert; the
    // cached plans themselves are immutable.
    let mut cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(cached_fft) = cache.get(&cache_key) {
        return Ok(Arc::clone(cached_fft));
    }

    let mut planner = FftPlanner::<f64>::new();
    let new_fft = if is_forward {
        planner.plan_fft_forward(size)
    } else {
        planner.plan_fft_inverse(size)
    };

    cache.put(cache_key, new_fft.clone());
    Ok(new_fft)
}

/// Get cached FFT plan for forward transform
pub fn get_cached_fft_forward(size: usize) -> SurrogateResult<SharedFft> {
    get_cached_fft_plan(size, true)
}

/// Get cached FFT plan for inverse transform
pub fn get_cached_fft_inverse(size: usize) -> SurrogateResult<SharedFft> {
    get_cached_fft_plan(size, false)
}

/// Full-length forward transform of a real sequence.
///
/// Unnormalized, matching the usual DFT definition
/// `X[k] = sum_t x[t] exp(-2 pi i k t / n)`.
pub fn forward_fft(data: &[f64]) -> SurrogateResult<Vec<Complex64>> {
    let fft = get_cached_fft_forward(data.len())?;
    let mut buffer: Vec<Complex64> = data.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    fft.process(&mut buffer);
    Ok(buffer)
}

/// Inverse transform returning only the real part, normalized by `1/n`.
///
/// Callers pass Hermitian spectra, so the discarded imaginary part is
/// round-off.
pub fn inverse_fft_real(mut spectrum: Vec<Complex64>) -> SurrogateResult<Vec<f64>> {
    let n = spectrum.len();
    let fft = get_cached_fft_inverse(n)?;
    fft.process(&mut spectrum);

    let normalization = 1.0 / n as f64;
    Ok(spectrum.iter().map(|c| c.re * normalization).collect())
}

/// Magnitude of every bin of the full-length forward transform.
pub fn amplitude_spectrum(data: &[f64]) -> SurrogateResult<Vec<f64>> {
    Ok(forward_fft(data)?.iter().map(|c| c.norm()).collect())
}

/// Relative L2 distance between two amplitude spectra.
///
/// Returns `||target - current|| / ||target||`, or 0 when the target has no
/// energy. Spectra are rescaled by their largest bin before squaring.
pub fn relative_spectrum_error(target: &[f64], current: &[f64]) -> SurrogateResult<f64> {
    if target.len() != current.len() {
        return Err(SurrogateError::LengthMismatch {
            context: "relative_spectrum_error".to_string(),
            expected: target.len(),
            actual: current.len(),
        });
    }

    let scale = target
        .iter()
        .chain(current)
        .fold(0.0_f64, |max, v| max.max(v.abs()));
    if scale == 0.0 {
        return Ok(0.0);
    }

    let mut error = 0.0;
    let mut total = 0.0;
    for (t, c) in target.iter().zip(current) {
        error += (t / scale - c / scale).powi(2);
        total += (t / scale).powi(2);
    }

    if total > 0.0 {
        Ok((error / total).sqrt())
    } else {
        Ok(0.0)
    }
}

/// Clear the FFT plan cache to free memory
pub fn clear_fft_cache() {
    match FFT_CACHE.lock() {
        Ok(mut cache) => cache.clear(),
        Err(poisoned) => poisoned.into_inner().clear(),
    }
}

/// Returns (forward_plans, inverse_plans) currently cached.
pub fn get_fft_cache_stats() -> (usize, usize) {
    let cache = match FFT_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let forward = cache.iter().filter(|(key, _)| key.is_forward).count();
    let inverse = cache.len() - forward;
    (forward, inverse)
}
