//! Shared utilities for the numeric kernels
//!
//! Provides a dense, row-per-item view of a batch of embeddings.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

/// Errors raised while building an [`EmbeddingMatrix`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Dimension mismatch at row {row}: expected {expected}, got {got}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// A dense `rows x dims` matrix of embeddings, one row per input item.
///
/// Rows keep the order of the input slice so results can be mapped back
/// by index.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Array2<f64>,
}

impl EmbeddingMatrix {
    /// Build a matrix from equally sized vectors
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, MatrixError> {
        let dims = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * dims);

        for (row, values) in rows.iter().enumerate() {
            if values.len() != dims {
                return Err(MatrixError::DimensionMismatch {
                    row,
                    expected: dims,
                    got: values.len(),
                });
            }
            flat.extend(values.iter().map(|&v| v as f64));
        }

        // Shape and length agree by construction
        let data = Array2::from_shape_vec((rows.len(), dims), flat)
            .unwrap_or_else(|_| Array2::zeros((0, 0)));
        Ok(Self { data })
    }

    /// Number of rows (items)
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Dimensionality of each row
    pub fn dims(&self) -> usize {
        self.data.ncols()
    }

    /// Get a single row
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.data.row(idx)
    }

    /// Column means
    pub fn mean(&self) -> Array1<f64> {
        self.data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.dims()))
    }

    /// Copy of the data with the column means subtracted
    pub fn centered(&self) -> Array2<f64> {
        &self.data - &self.mean()
    }

    /// Borrow the underlying array
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }
}

/// Squared Euclidean distance between two rows/centroids
pub(crate) fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
