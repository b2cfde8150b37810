//! Translational knowledge graph embeddings.
//!
//! Knowledge graphs store facts as (head, relation, tail) triples:
//! `(Einstein, won, NobelPrize)`, `(Paris, capitalOf, France)`. This crate
//! learns a vector per entity and per relation such that valid facts satisfy
//! the translational relationship of TransE
//! ([Bordes et al. 2013](https://papers.nips.cc/paper/2013/hash/1cecc7a77928ca8133fa24680a88d2f9-Abstract.html)):
//!
//! ```text
//! h + r ≈ t  (if the triple is true)
//! ```
//!
//! # Components
//!
//! | Component | Type | Role |
//! |-----------|------|------|
//! | Embedding store + scoring | [`TransE`] | dense tables, p-norm dissimilarity, margin loss |
//! | Negative sampler | [`NegativeSampler`] | one corrupted triple per true triple |
//! | Training loop | [`Trainer`] | SGD over margin ranking loss, metric emission |
//! | Ranking evaluator | [`evaluate`] | two-sided all-entity sweep, Hits@K and MRR |
//! | Checkpoint state | [`Snapshot`] | extract/restore hooks for external persistence |
//!
//! Triples travel as dense integer IDs assigned by an external dataset
//! collaborator; parsing, persistence, and the CLI surface live outside this
//! crate. All hyperparameters arrive through [`ModelConfig`] and
//! [`TrainingConfig`]; there is no global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_kge::{evaluate, ModelConfig, NullSink, TrainingConfig, Trainer, TransE, TripleBatch};
//!
//! let model = TransE::new(ModelConfig::new(entity_count, relation_count).with_dim(50))?;
//! let mut trainer = Trainer::new(model, TrainingConfig::default());
//!
//! let mut sink = NullSink;
//! for _ in 0..epochs {
//!     trainer.train_epoch(&train_batches, &mut sink)?;
//! }
//!
//! let report = evaluate(trainer.model(), &test_batches)?;
//! println!("Hits@10 = {:.2}, MRR = {:.2}", report.hits_at_10, report.mrr);
//! ```

mod batch;
mod checkpoint;
mod config;
mod error;
mod evaluation;
mod model;
mod sampling;
mod training;

pub use batch::TripleBatch;
pub use checkpoint::Snapshot;
pub use config::{ModelConfig, Norm, TrainingConfig};
pub use error::{Error, Result};
pub use evaluation::{evaluate, RankReport};
pub use model::{ForwardOutput, TransE};
pub use sampling::NegativeSampler;
pub use training::{EpochStats, MetricSink, NullSink, Trainer};
