pub mod common;
pub mod similarity;
pub mod pca;
pub mod kmeans;

pub use common::{EmbeddingMatrix, MatrixError};
pub use similarity::{cosine_similarity, euclidean_distance};
pub use pca::{project_2d, PcaConfig, Point2};
pub use kmeans::{kmeans, KMeansConfig, KMeansResult};
