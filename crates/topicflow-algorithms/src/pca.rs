//! Principal component projection to two dimensions
//!
//! The principal axes are found by power iteration on the implicit
//! covariance `X^T X` of the mean-centred batch, so no `dims x dims` matrix
//! is ever materialised. The second axis is kept orthogonal to the first by
//! deflation on every step.

use super::common::EmbeddingMatrix;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A projected 2D coordinate `[x, y]`
pub type Point2 = [f64; 2];

/// PCA configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcaConfig {
    /// Maximum power iterations per component
    pub max_iterations: usize,
    /// Stop once `1 - |<v_new, v_old>|` drops below this
    pub tolerance: f64,
    /// Seed for the starting vectors
    pub seed: u64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-12,
            seed: 42,
        }
    }
}

/// Project every row of `matrix` onto its first two principal components.
///
/// Fewer than two rows cannot define a spread, so every row maps to
/// `[0.0, 0.0]`. Output order matches row order.
pub fn project_2d(matrix: &EmbeddingMatrix, config: &PcaConfig) -> Vec<Point2> {
    let n = matrix.rows();
    if n < 2 || matrix.dims() == 0 {
        return vec![[0.0, 0.0]; n];
    }

    let centered = matrix.centered();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let first = principal_axis(&centered, &[], &mut rng, config);
    let second = principal_axis(&centered, &[first.clone()], &mut rng, config);

    let xs = centered.dot(&first);
    let ys = centered.dot(&second);

    xs.iter().zip(ys.iter()).map(|(&x, &y)| [x, y]).collect()
}

/// Dominant eigenvector of `X^T X` orthogonal to `fixed`, or the zero
/// vector when the remaining variance is zero.
fn principal_axis(
    centered: &Array2<f64>,
    fixed: &[Array1<f64>],
    rng: &mut StdRng,
    config: &PcaConfig,
) -> Array1<f64> {
    let dims = centered.ncols();
    let mut v: Array1<f64> = (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect();

    orthogonalize(&mut v, fixed);
    if !normalize(&mut v) {
        return Array1::zeros(dims);
    }

    for _ in 0..config.max_iterations {
        let mut next = centered.t().dot(&centered.dot(&v));
        orthogonalize(&mut next, fixed);
        if !normalize(&mut next) {
            return Array1::zeros(dims);
        }

        let agreement = next.dot(&v).abs();
        v = next;
        if 1.0 - agreement < config.tolerance {
            break;
        }
    }

    flip_sign(&mut v);
    v
}

fn orthogonalize(v: &mut Array1<f64>, fixed: &[Array1<f64>]) {
    for axis in fixed {
        let proj = v.dot(axis);
        v.scaled_add(-proj, axis);
    }
}

/// Scale to unit length; false when the vector is (numerically) zero
fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(v).sqrt();
    if norm <= 1e-12 {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}

/// Make the largest-magnitude loading positive so the axis orientation does
/// not depend on the starting vector.
fn flip_sign(v: &mut Array1<f64>) {
    let mut pivot = 0.0f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}
