//! Checkpoint state extraction and restore.
//!
//! The core does not persist anything itself; it exposes exactly the state
//! an external checkpoint collaborator needs to save and later hand back:
//! both embedding tables, the optimizer state (for plain SGD, the learning
//! rate), the epoch and global step counters, and the best validation score
//! so far. RNG state is deliberately not captured; a restored run reseeds
//! its sampler from the model seed.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

/// Complete trainer state for the checkpoint collaborator.
///
/// Produced by [`Trainer::snapshot`](crate::Trainer::snapshot) and consumed
/// by [`Trainer::restore`](crate::Trainer::restore). Serializable with any
/// serde backend the collaborator chooses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Model hyperparameters the tables were built with.
    pub model: ModelConfig,
    /// Entity table including the padding row, shape `(entity_count + 1, dim)`.
    pub entities: Array2<f32>,
    /// Relation table including the padding row, shape `(relation_count + 1, dim)`.
    pub relations: Array2<f32>,
    /// SGD learning rate in effect when the snapshot was taken.
    pub learning_rate: f32,
    /// Completed epochs.
    pub epoch: usize,
    /// Global step counter.
    pub step: u64,
    /// Best validation score (Hits@10, scaled by 100) seen so far.
    pub best_score: f64,
}
