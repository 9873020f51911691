//! Small dense matrix helpers for the regression models
//!
//! Matrices are row-major `Vec<Vec<f64>>`; the models never exceed a handful
//! of columns.

use nalgebra::DMatrix;

/// Dense row-major matrix
pub type Matrix = Vec<Vec<f64>>;

/// Pivot magnitude below which a matrix counts as singular
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// `n x n` zero matrix
#[must_use]
pub fn zeros(n: usize) -> Matrix {
    vec![vec![0.0; n]; n]
}

/// Invert a square matrix through an LU factorization.
///
/// Returns `None` for singular (or non-finite) input.
#[must_use]
pub fn invert(matrix: &Matrix) -> Option<Matrix> {
    let n = matrix.len();
    if matrix.iter().any(|row| row.len() != n) {
        return None;
    }
    if n == 0 {
        return Some(Vec::new());
    }

    let dense = DMatrix::from_fn(n, n, |i, j| matrix[i][j]);
    let scale = dense.amax();
    if !scale.is_finite() {
        return None;
    }

    // Scale-aware pivot tolerance
    let tolerance = SINGULAR_EPSILON * scale.max(1.0);
    let lu = dense.lu();
    if lu.u().diagonal().iter().any(|pivot| pivot.abs() <= tolerance) {
        return None;
    }

    let inverse = lu.try_inverse()?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(
        inverse
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect(),
    )
}

/// Matrix-vector product
#[must_use]
pub fn mat_vec(matrix: &Matrix, vector: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
        .collect()
}

/// Accumulate `x xᵀ` into `target`
pub fn add_outer(target: &mut Matrix, x: &[f64], weight: f64) {
    for (i, xi) in x.iter().enumerate() {
        for (j, xj) in x.iter().enumerate() {
            target[i][j] += weight * xi * xj;
        }
    }
}

/// Dot product
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
