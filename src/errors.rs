//! Error types and validation functions for surrogate generation.
//!
//! Invalid input is rejected by these helpers before any transform runs, so a
//! caller never receives a partially generated collection.

use thiserror::Error;

/// Error types for surrogate generation.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SurrogateError {
    /// Input sequence is too short for surrogate generation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid configuration value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical failure such as non-finite input or an oversized allocation.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
    },

    /// FFT planning failed for the requested length.
    #[error("FFT computation failed: input size {size} not supported")]
    FftError {
        /// Input size that caused the FFT failure
        size: usize,
    },

    /// Two sequences that must share a length do not.
    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Operation that detected the mismatch
        context: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// One or more surrogates did not converge under the abort policy.
    #[error("{} of {total} surrogates failed to converge (indices {failed:?})", .failed.len())]
    ConvergenceFailure {
        /// Column indices of the surrogates that did not converge
        failed: Vec<usize>,
        /// Number of surrogates requested
        total: usize,
    },

    /// Generation was cancelled through a cancellation token.
    #[error("Surrogate generation cancelled after {completed} of {total} surrogates")]
    Cancelled {
        /// Surrogates that reached a terminal state before cancellation
        completed: usize,
        /// Number of surrogates requested
        total: usize,
    },
}

/// Result type for surrogate generation operations.
pub type SurrogateResult<T> = Result<T, SurrogateError>;

/// Validates that data has sufficient length.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> SurrogateResult<()> {
    if data.len() < min_required {
        Err(SurrogateError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within `[min, max]`.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_parameter;
///
/// assert!(validate_parameter(1e-6, f64::MIN_POSITIVE, 1.0, "tolerance").is_ok());
/// assert!(validate_parameter(0.0, f64::MIN_POSITIVE, 1.0, "tolerance").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> SurrogateResult<()> {
    if value.is_nan() {
        return Err(SurrogateError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(SurrogateError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
        });
    }

    if value < min || value > max {
        Err(SurrogateError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{:e}, {:e}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value and reports its index.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "series").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "series").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> SurrogateResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };

        return Err(SurrogateError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
        });
    }

    Ok(())
}

/// Validate an allocation size before building large buffers.
///
/// The limit is 1 GiB; anything larger almost certainly comes from an
/// overflowed `length * count` product.
///
/// # Example
/// ```rust
/// use iaaft_surrogates::errors::validate_allocation_size;
///
/// assert!(validate_allocation_size(1000, "test").is_ok());
/// assert!(validate_allocation_size(2_000_000_000, "test").is_err());
/// ```
pub fn validate_allocation_size(size: usize, operation: &str) -> SurrogateResult<()> {
    const MAX_SAFE_ALLOCATION: usize = 1 << 30;

    if size > MAX_SAFE_ALLOCATION {
        return Err(SurrogateError::NumericalError {
            reason: format!(
                "Attempted allocation of {} bytes ({:.2} GB) in '{}' exceeds \
                 safety limit of {} bytes (1.0 GB)",
                size,
                size as f64 / (1024.0 * 1024.0 * 1024.0),
                operation,
                MAX_SAFE_ALLOCATION
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_data_length_insufficient() {
        let data = vec![1.0];
        match validate_data_length(&data, 2) {
            Err(SurrogateError::InsufficientData { required, actual }) => {
                assert_eq!(required, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("Expected InsufficientData error, got {:?}", other),
        }

        let empty: Vec<f64> = vec![];
        assert!(matches!(
            validate_data_length(&empty, 2),
            Err(SurrogateError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn test_validate_data_length_exact_minimum() {
        assert!(validate_data_length(&[1.0, 2.0], 2).is_ok());
    }

    #[test]
    fn test_validate_parameter_bounds() {
        assert!(validate_parameter(0.5, 0.0, 1.0, "p").is_ok());
        assert!(validate_parameter(0.0, 0.0, 1.0, "p").is_ok());
        assert!(validate_parameter(1.0, 0.0, 1.0, "p").is_ok());

        match validate_parameter(1.5, 0.0, 1.0, "p") {
            Err(SurrogateError::InvalidParameter {
                parameter, value, ..
            }) => {
                assert_eq!(parameter, "p");
                assert_eq!(value, 1.5);
            }
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_parameter_nan_inputs() {
        assert!(matches!(
            validate_parameter(f64::NAN, 0.0, 1.0, "p"),
            Err(SurrogateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, f64::NAN, 1.0, "p"),
            Err(SurrogateError::NumericalError { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, 1.0, 0.0, "p"),
            Err(SurrogateError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        match validate_all_finite(&[1.0, 2.0, f64::NAN, 4.0], "series") {
            Err(SurrogateError::NumericalError { reason }) => {
                assert!(reason.contains("series"));
                assert!(reason.contains("index 2"));
                assert!(reason.contains("NaN"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }

        match validate_all_finite(&[f64::NEG_INFINITY, 2.0], "series") {
            Err(SurrogateError::NumericalError { reason }) => {
                assert!(reason.contains("index 0"));
                assert!(reason.contains("-Infinity"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }

        assert!(validate_all_finite(&[], "series").is_ok());
    }

    #[test]
    fn test_validate_allocation_size() {
        assert!(validate_allocation_size(1 << 30, "test").is_ok());
        assert!(matches!(
            validate_allocation_size((1 << 30) + 1, "test"),
            Err(SurrogateError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_error_display_formatting() {
        let err = SurrogateError::InsufficientData {
            required: 2,
            actual: 1,
        };
        let text = err.to_string();
        assert!(text.contains("Insufficient data"));
        assert!(text.contains('2'));

        let err = SurrogateError::ConvergenceFailure {
            failed: vec![0, 3],
            total: 5,
        };
        let text = err.to_string();
        assert!(text.contains("2 of 5"));
        assert!(text.contains("[0, 3]"));

        let err = SurrogateError::Cancelled {
            completed: 1,
            total: 4,
        };
        assert!(err.to_string().contains("cancelled"));
    }
}
