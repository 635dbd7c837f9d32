//! Input preparation for surrogate generation.
//!
//! A sequence whose endpoints differ is, to the DFT, a periodic signal with a
//! jump at the wrap-around. That jump leaks power into every bin, and the
//! surrogates inherit the leakage. Removing the straight line joining the
//! first and last sample closes the gap before the targets are computed.

use crate::errors::{validate_all_finite, validate_data_length, SurrogateResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum sequence length accepted by the generator.
pub const MIN_SERIES_LENGTH: usize = 2;

/// Linear trend joining the first and last sample of a sequence.
///
/// Sample `i` carries `slope * i` of trend, so the first sample is left
/// unchanged and the last one is shifted down to the first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EndpointTrend {
    /// Trend increment per sample, `(x[n-1] - x[0]) / (n - 1)`
    pub slope: f64,
}

impl EndpointTrend {
    /// Measure the endpoint trend of `data`.
    pub fn fit(data: &[f64]) -> SurrogateResult<Self> {
        validate_data_length(data, MIN_SERIES_LENGTH)?;
        let n = data.len();
        let slope = (data[n - 1] - data[0]) / (n - 1) as f64;
        Ok(Self { slope })
    }

    /// Trend value at sample `i`.
    pub fn value_at(&self, i: usize) -> f64 {
        self.slope * i as f64
    }

    /// Subtract the trend, returning a new sequence.
    pub fn remove(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .enumerate()
            .map(|(i, &x)| x - self.value_at(i))
            .collect()
    }

    /// Add the trend back in place.
    pub fn restore(&self, data: &mut [f64]) {
        for (i, x) in data.iter_mut().enumerate() {
            *x += self.value_at(i);
        }
    }
}

/// Sequence ready for target computation, with the trend that was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Values the surrogates are built from
    pub values: Vec<f64>,
    /// Trend removed from the input, if detrending was requested
    pub trend: Option<EndpointTrend>,
}

/// Validate the input and optionally remove its endpoint trend.
///
/// The caller's slice is never modified.
pub fn prepare_series(data: &[f64], detrend: bool) -> SurrogateResult<PreparedSeries> {
    validate_data_length(data, MIN_SERIES_LENGTH)?;
    validate_all_finite(data, "input series")?;

    if detrend {
        log::debug!("Detrending series of length {}", data.len());
        let trend = EndpointTrend::fit(data)?;
        Ok(PreparedSeries {
            values: trend.remove(data),
            trend: Some(trend),
        })
    } else {
        Ok(PreparedSeries {
            values: data.to_vec(),
            trend: None,
        })
    }
}
