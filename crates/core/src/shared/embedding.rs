//! Embedding normalization and cosine similarity over unit-length rows.
//!
//! Vectors are L2-normalized once up front so that every similarity after
//! that is a plain dot product.
use ndarray::{s, Array1, Array2, ArrayView1};

use crate::shared::analysis_error::AnalysisError;

/// L2-normalizes `v`, or returns `None` for zero-magnitude / non-finite input.
pub fn normalized(v: &[f32]) -> Option<Array1<f64>> {
    let unit = Array1::from_iter(v.iter().map(|&x| x as f64));
    let norm = unit.dot(&unit).sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return None;
    }
    Some(unit / norm)
}

/// Like [`normalized`] but reports a degenerate vector as an error.
pub fn unit_vector(v: &[f32], subject: &str) -> Result<Array1<f64>, AnalysisError> {
    normalized(v).ok_or_else(|| AnalysisError::DegenerateEmbedding {
        subject: subject.to_string(),
    })
}

pub fn check_dimension(expected: usize, v: &[f32], subject: &str) -> Result<(), AnalysisError> {
    if v.len() != expected {
        return Err(AnalysisError::DimensionMismatch {
            subject: subject.to_string(),
            expected,
            found: v.len(),
        });
    }
    Ok(())
}

/// Row-major matrix of unit-length embeddings sharing one dimension.
#[derive(Clone, Debug)]
pub struct EmbeddingMatrix {
    rows: Array2<f64>,
}

impl EmbeddingMatrix {
    /// Validates and normalizes `rows`.
    ///
    /// The dimension comes from the first non-empty row. Every row is checked
    /// for shape before any is checked for magnitude, and empty rows are
    /// always a dimension mismatch, so the error kind does not depend on row
    /// order. `subject` names row `i` in error messages and is only called
    /// on failure.
    pub fn from_rows(
        rows: &[&[f32]],
        subject: impl Fn(usize) -> String,
    ) -> Result<Self, AnalysisError> {
        let dim = rows.iter().map(|r| r.len()).find(|&len| len > 0).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.is_empty() || row.len() != dim {
                return Err(AnalysisError::DimensionMismatch {
                    subject: subject(i),
                    expected: dim,
                    found: row.len(),
                });
            }
        }

        let mut matrix = Array2::<f64>::zeros((rows.len(), dim));
        for (i, row) in rows.iter().enumerate() {
            let unit = normalized(row).ok_or_else(|| AnalysisError::DegenerateEmbedding {
                subject: subject(i),
            })?;
            matrix.row_mut(i).assign(&unit);
        }
        Ok(Self { rows: matrix })
    }

    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    pub fn dim(&self) -> usize {
        self.rows.ncols()
    }

    /// Similarities between row `i` and every row after it, in row order.
    pub fn similarities_after(&self, i: usize) -> Array1<f64> {
        self.rows.slice(s![i + 1.., ..]).dot(&self.rows.row(i))
    }

    /// Similarities between every row and a unit-length `query`.
    ///
    /// `query` must have the matrix dimension unless the matrix is empty.
    pub fn similarities_to(&self, query: &ArrayView1<'_, f64>) -> Array1<f64> {
        if self.is_empty() {
            return Array1::zeros(0);
        }
        self.rows.dot(query)
    }
}
