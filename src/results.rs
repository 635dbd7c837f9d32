//! # Surrogate Results
//!
//! The N x M surrogate matrix and the per-surrogate diagnostics that describe
//! how each column was obtained.

use crate::errors::{SurrogateError, SurrogateResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terminal state of one surrogate's refinement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurrogateStatus {
    /// Relative change between passes fell to the tolerance
    Converged,
    /// Iteration cap reached first; the column is the last iterate
    MaxIterationsReached,
    /// Iterate energy too small for the convergence ratio
    Degenerate,
}

impl SurrogateStatus {
    /// True only for [`SurrogateStatus::Converged`].
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// How one surrogate column was produced.
///
/// Observability only: nothing here feeds back into the values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurrogateDiagnostics {
    /// Column index in the collection
    pub index: usize,
    /// Seed of the random stream used to initialize this surrogate
    pub seed: Option<u64>,
    /// Refinement passes performed
    pub iterations: usize,
    /// How the loop ended
    pub status: SurrogateStatus,
    /// Relative energy of the last change; `None` when degenerate
    pub relative_energy: Option<f64>,
    /// Relative L2 error of the final amplitude spectrum against the target
    pub spectrum_error: f64,
}

/// N x M matrix of surrogates, one surrogate per column.
///
/// Stored column-major: element `(row, col)` lives at `row + col * n_rows`,
/// so each surrogate is a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurrogateCollection {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
    diagnostics: Vec<SurrogateDiagnostics>,
    master_seed: u64,
}

impl SurrogateCollection {
    /// Assemble a collection from equally long columns.
    pub fn from_columns(
        columns: Vec<Vec<f64>>,
        diagnostics: Vec<SurrogateDiagnostics>,
        master_seed: u64,
    ) -> SurrogateResult<Self> {
        let n_cols = columns.len();
        let n_rows = columns.first().map_or(0, Vec::len);

        if diagnostics.len() != n_cols {
            return Err(SurrogateError::LengthMismatch {
                context: "surrogate diagnostics".to_string(),
                expected: n_cols,
                actual: diagnostics.len(),
            });
        }

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for column in columns {
            if column.len() != n_rows {
                return Err(SurrogateError::LengthMismatch {
                    context: "surrogate column".to_string(),
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            data.extend(column);
        }

        Ok(Self {
            data,
            n_rows,
            n_cols,
            diagnostics,
            master_seed,
        })
    }

    /// Sequence length N.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of surrogates M.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Surrogate `col`.
    ///
    /// # Panics
    /// Panics if `col >= n_cols()`.
    pub fn column(&self, col: usize) -> &[f64] {
        assert!(col < self.n_cols, "column {} out of range", col);
        let start = col * self.n_rows;
        &self.data[start..start + self.n_rows]
    }

    /// Iterate over surrogates in column order.
    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size; an empty series has no columns to yield
        self.data.chunks_exact(self.n_rows.max(1)).take(self.n_cols)
    }

    /// Element at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.data[row + col * self.n_rows])
        } else {
            None
        }
    }

    /// Owned copy of every surrogate, one vector of length N per column.
    pub fn to_column_vecs(&self) -> Vec<Vec<f64>> {
        self.columns().map(<[f64]>::to_vec).collect()
    }

    /// Flat column-major storage.
    pub fn as_column_major(&self) -> &[f64] {
        &self.data
    }

    /// Diagnostics, one per column.
    pub fn diagnostics(&self) -> &[SurrogateDiagnostics] {
        &self.diagnostics
    }

    /// Master seed the per-surrogate streams were derived from.
    ///
    /// Passing it back as the configured seed replays this batch.
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// True when every surrogate converged.
    pub fn all_converged(&self) -> bool {
        self.diagnostics.iter().all(|d| d.status.is_converged())
    }

    /// Column indices of surrogates that did not converge.
    pub fn non_converged(&self) -> Vec<usize> {
        self.diagnostics
            .iter()
            .filter(|d| !d.status.is_converged())
            .map(|d| d.index)
            .collect()
    }
}
