//! Configuration for model construction and training.
//!
//! All hyperparameters are passed in explicitly at construction time; no
//! component reads global state.

use serde::{Deserialize, Serialize};

/// Order of the dissimilarity norm used by the scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Norm {
    /// L1 (Manhattan) distance.
    #[default]
    L1,
    /// L2 (Euclidean) distance.
    L2,
}

/// Model hyperparameters.
///
/// `entity_count` and `relation_count` are the *real* vocabulary sizes; each
/// embedding table carries one extra padding row at index `count` that stands
/// in for out-of-vocabulary IDs and is never trained or normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of entities (excluding the padding row).
    pub entity_count: usize,
    /// Number of relations (excluding the padding row).
    pub relation_count: usize,
    /// Embedding dimension (default: 50).
    pub dim: usize,
    /// Margin for the ranking loss (default: 1.0).
    pub margin: f32,
    /// Norm used for the dissimilarity score (default: L1).
    pub norm: Norm,
    /// Seed for embedding initialization (default: 1234).
    pub seed: u64,
}

impl ModelConfig {
    /// Create a configuration with default hyperparameters for the given
    /// vocabulary sizes.
    pub fn new(entity_count: usize, relation_count: usize) -> Self {
        Self {
            entity_count,
            relation_count,
            dim: 50,
            margin: 1.0,
            norm: Norm::default(),
            seed: 1234,
        }
    }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// SGD learning rate (default: 0.01).
    pub learning_rate: f32,
    /// Number of training epochs (default: 100).
    pub epochs: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 100,
        }
    }
}

impl TrainingConfig {
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }
}
