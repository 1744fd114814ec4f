//! k-means clustering
//!
//! Lloyd's algorithm with k-means++ seeding and several restarts. All
//! randomness comes from one seeded generator, so identical input and
//! configuration always produce identical labels.

use super::common::{squared_distance, EmbeddingMatrix};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// k-means configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Independent restarts; the lowest inertia wins
    pub n_init: usize,
    /// Lloyd iterations per restart
    pub max_iterations: usize,
    /// Convergence threshold on the largest squared centroid shift
    pub tolerance: f64,
    /// Seed for centroid initialisation
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Result of a k-means run
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster label per row, in `[0, k)`
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    /// Whether a real partition was computed (false for the single-group fallback)
    pub fitted: bool,
}

/// Partition the rows of `matrix` into `config.k` groups.
///
/// With fewer rows than clusters (or `k < 2`) there is nothing to
/// partition and every row gets label `0`. Labels are renumbered by first
/// appearance, so row 0 is always in cluster 0.
pub fn kmeans(matrix: &EmbeddingMatrix, config: &KMeansConfig) -> KMeansResult {
    let n = matrix.rows();
    if config.k < 2 || n < config.k {
        return KMeansResult {
            labels: vec![0; n],
            inertia: 0.0,
            fitted: false,
        };
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<(Vec<usize>, f64)> = None;

    for _ in 0..config.n_init.max(1) {
        let centroids = init_plus_plus(matrix, config.k, &mut rng);
        let (labels, inertia) = lloyd(matrix, centroids, config);

        let improved = match &best {
            Some((_, best_inertia)) => inertia < *best_inertia,
            None => true,
        };
        if improved {
            best = Some((labels, inertia));
        }
    }

    let (labels, inertia) = best.unwrap_or_else(|| (vec![0; n], 0.0));
    KMeansResult {
        labels: relabel_by_first_appearance(&labels),
        inertia,
        fitted: true,
    }
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn init_plus_plus(matrix: &EmbeddingMatrix, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = matrix.rows();
    let mut centroids = Array2::zeros((k, matrix.dims()));

    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&matrix.row(first));

    let mut nearest: Vec<f64> = (0..n)
        .map(|i| squared_distance(matrix.row(i), centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = nearest.iter().sum();
        let chosen = if total <= 0.0 {
            rng.gen_range(0..n)
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = n - 1;
            for (i, &d) in nearest.iter().enumerate() {
                if target < d {
                    pick = i;
                    break;
                }
                target -= d;
            }
            pick
        };

        centroids.row_mut(c).assign(&matrix.row(chosen));
        for (i, slot) in nearest.iter_mut().enumerate() {
            let d = squared_distance(matrix.row(i), centroids.row(c));
            if d < *slot {
                *slot = d;
            }
        }
    }

    centroids
}

fn lloyd(
    matrix: &EmbeddingMatrix,
    mut centroids: Array2<f64>,
    config: &KMeansConfig,
) -> (Vec<usize>, f64) {
    let n = matrix.rows();
    let k = centroids.nrows();
    let mut labels = vec![0usize; n];

    for _ in 0..config.max_iterations {
        assign(matrix, &centroids, &mut labels);

        let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            let mut row = sums.row_mut(label);
            row += &matrix.row(i);
            counts[label] += 1;
        }

        let mut max_shift = 0.0f64;
        for c in 0..k {
            // An empty cluster keeps its previous centroid
            if counts[c] == 0 {
                continue;
            }
            let updated: Array1<f64> = sums.row(c).mapv(|x| x / counts[c] as f64);
            let shift = squared_distance(updated.view(), centroids.row(c));
            max_shift = max_shift.max(shift);
            centroids.row_mut(c).assign(&updated);
        }

        if max_shift <= config.tolerance {
            break;
        }
    }

    let inertia = assign(matrix, &centroids, &mut labels);
    (labels, inertia)
}

/// Assign each row to its nearest centroid (lowest index on ties) and
/// return the inertia.
fn assign(matrix: &EmbeddingMatrix, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (i, label) in labels.iter_mut().enumerate() {
        let row = matrix.row(i);
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for c in 0..centroids.nrows() {
            let d = squared_distance(row, centroids.row(c));
            if d < best_dist {
                best_dist = d;
                best = c;
            }
        }
        *label = best;
        inertia += best_dist;
    }
    inertia
}

fn relabel_by_first_appearance(labels: &[usize]) -> Vec<usize> {
    let mut mapping: Vec<Option<usize>> = Vec::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&label| {
            if label >= mapping.len() {
                mapping.resize(label + 1, None);
            }
            *mapping[label].get_or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<f32>]) -> EmbeddingMatrix {
        EmbeddingMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_fewer_rows_than_clusters() {
        let m = matrix(&[
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![5.0, 5.0],
            vec![2.0, 1.0],
            vec![9.0, 0.0],
        ]);
        let result = kmeans(&m, &KMeansConfig::new(8));
        assert_eq!(result.labels, vec![0; 5]);
        assert!(!result.fitted);
    }

    #[test]
    fn test_two_obvious_groups() {
        let m = matrix(&[
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.1, 0.0],
            vec![10.1, 10.0],
            vec![0.0, 0.1],
        ]);
        let result = kmeans(&m, &KMeansConfig::new(2));
        assert!(result.fitted);
        assert_eq!(result.labels, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_labels_in_range_and_deterministic() {
        let rows: Vec<Vec<f32>> = (0..20)
            .map(|i| vec![(i % 7) as f32, (i * 3 % 5) as f32, (i % 2) as f32])
            .collect();
        let config = KMeansConfig::new(4);
        let a = kmeans(&matrix(&rows), &config);
        let b = kmeans(&matrix(&rows), &config);

        assert_eq!(a.labels, b.labels);
        assert!(a.labels.iter().all(|&l| l < 4));
        assert_eq!(a.labels[0], 0);
    }

    #[test]
    fn test_duplicate_points_do_not_panic() {
        let m = matrix(&[vec![1.0], vec![1.0], vec![1.0]]);
        let result = kmeans(&m, &KMeansConfig::new(3));
        assert_eq!(result.labels.len(), 3);
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_relabel() {
        assert_eq!(relabel_by_first_appearance(&[2, 2, 0, 1, 0]), vec![0, 0, 1, 2, 1]);
    }
}
