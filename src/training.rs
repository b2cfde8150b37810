//! Margin-based training loop.
//!
//! One training step:
//! 1. corrupt the batch ([`NegativeSampler`](crate::NegativeSampler)),
//! 2. forward pass (entity renormalization, scoring, per-example margin
//!    ranking loss),
//! 3. one SGD update covering every embedding row that participated.
//!
//! The step is atomic from the model's perspective: the update is
//! accumulated over the batch and applied in one pass, between steps the
//! tables are never partially written. Scalar diagnostics are pushed to a
//! caller-supplied [`MetricSink`] after each step and each epoch.

use tracing::debug;

use crate::batch::TripleBatch;
use crate::checkpoint::Snapshot;
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::evaluation::RankReport;
use crate::model::TransE;
use crate::sampling::NegativeSampler;

/// Consumer of scalar training/evaluation metrics.
///
/// Implementations wrap whatever experiment-tracking backend the caller
/// uses; the core only pushes `(name, value, step)` triples. Steps are
/// monotonically increasing within a name.
pub trait MetricSink {
    fn scalar(&mut self, name: &str, value: f64, step: u64);
}

/// Sink that discards every metric.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricSink for NullSink {
    fn scalar(&mut self, _name: &str, _value: f64, _step: u64) {}
}

/// Aggregate diagnostics for one training epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochStats {
    /// Mean per-example loss over the epoch.
    pub mean_loss: f32,
    /// Percentage of examples with strictly positive loss (margin not yet
    /// satisfied). Monitoring only; does not feed back into the objective.
    pub loss_impacting_pct: f64,
    /// Number of training examples seen.
    pub samples: usize,
}

/// Drives SGD training of a [`TransE`] model.
pub struct Trainer {
    model: TransE,
    sampler: NegativeSampler,
    config: TrainingConfig,
    epoch: usize,
    step: u64,
    best_score: f64,
}

impl Trainer {
    /// Create a trainer around a freshly built or restored model.
    ///
    /// The negative sampler is seeded from the model seed + 1 so that
    /// initialization and corruption draw from independent streams.
    pub fn new(model: TransE, config: TrainingConfig) -> Self {
        let sampler = NegativeSampler::new(model.entity_count(), model.config().seed + 1);
        Self {
            model,
            sampler,
            config,
            epoch: 0,
            step: 0,
            best_score: 0.0,
        }
    }

    /// The model being trained.
    pub fn model(&self) -> &TransE {
        &self.model
    }

    /// Completed epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Global step counter (one step per batch).
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Best evaluation score recorded via [`Trainer::record_validation`].
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Run one epoch over the given batches.
    ///
    /// Emits `loss/train` (mean batch loss), `distance/positive` and
    /// `distance/negative` (sums) per step, and
    /// `metrics/loss_impacting_samples` (percentage) per epoch.
    pub fn train_epoch(
        &mut self,
        batches: &[TripleBatch],
        sink: &mut dyn MetricSink,
    ) -> Result<EpochStats> {
        let mut loss_sum = 0.0f32;
        let mut impacting = 0usize;
        let mut samples = 0usize;

        for batch in batches {
            if batch.is_empty() {
                continue;
            }

            let negative = self.sampler.corrupt(batch);
            let out = self.model.forward(batch, &negative)?;
            self.model.apply_margin_gradients(
                batch,
                &negative,
                &out.loss,
                self.config.learning_rate,
            )?;

            let batch_loss: f32 = out.loss.iter().sum();
            sink.scalar(
                "loss/train",
                f64::from(batch_loss / batch.len() as f32),
                self.step,
            );
            sink.scalar(
                "distance/positive",
                out.positive_distances.iter().map(|&d| f64::from(d)).sum(),
                self.step,
            );
            sink.scalar(
                "distance/negative",
                out.negative_distances.iter().map(|&d| f64::from(d)).sum(),
                self.step,
            );

            loss_sum += batch_loss;
            impacting += out.loss.iter().filter(|&&l| l > 0.0).count();
            samples += batch.len();
            self.step += 1;
        }

        self.epoch += 1;

        let stats = EpochStats {
            mean_loss: if samples > 0 {
                loss_sum / samples as f32
            } else {
                0.0
            },
            loss_impacting_pct: if samples > 0 {
                impacting as f64 / samples as f64 * 100.0
            } else {
                0.0
            },
            samples,
        };
        sink.scalar(
            "metrics/loss_impacting_samples",
            stats.loss_impacting_pct,
            self.epoch as u64,
        );
        debug!(
            epoch = self.epoch,
            mean_loss = stats.mean_loss,
            loss_impacting_pct = stats.loss_impacting_pct,
            "epoch complete"
        );

        Ok(stats)
    }

    /// Train for the configured number of epochs.
    pub fn fit(
        &mut self,
        batches: &[TripleBatch],
        sink: &mut dyn MetricSink,
    ) -> Result<Vec<EpochStats>> {
        let mut history = Vec::with_capacity(self.config.epochs);
        for _ in 0..self.config.epochs {
            history.push(self.train_epoch(batches, sink)?);
        }
        Ok(history)
    }

    /// Record a validation result; Hits@10 drives the best score.
    ///
    /// Returns `true` when the score improved, which is the caller's cue to
    /// persist a [`Snapshot`].
    pub fn record_validation(&mut self, report: &RankReport) -> bool {
        if report.hits_at_10 > self.best_score {
            self.best_score = report.hits_at_10;
            true
        } else {
            false
        }
    }

    /// Extract everything the checkpoint collaborator persists.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            model: self.model.config().clone(),
            entities: self.model.entity_table().to_owned(),
            relations: self.model.relation_table().to_owned(),
            learning_rate: self.config.learning_rate,
            epoch: self.epoch,
            step: self.step,
            best_score: self.best_score,
        }
    }

    /// Rebuild a trainer from a snapshot.
    ///
    /// The snapshot's learning rate (the optimizer state of plain SGD)
    /// overrides the one in `config`; epoch, step and best score resume
    /// where the snapshot left off.
    pub fn restore(snapshot: Snapshot, mut config: TrainingConfig) -> Result<Self> {
        config.learning_rate = snapshot.learning_rate;
        let model = TransE::from_parts(snapshot.model, snapshot.entities, snapshot.relations)?;
        let sampler = NegativeSampler::new(model.entity_count(), model.config().seed + 1);
        Ok(Self {
            model,
            sampler,
            config,
            epoch: snapshot.epoch,
            step: snapshot.step,
            best_score: snapshot.best_score,
        })
    }
}
