//! TransE: relations as translations.
//!
//! TransE ([Bordes et al. 2013](https://papers.nips.cc/paper/2013/hash/1cecc7a77928ca8133fa24680a88d2f9-Abstract.html))
//! interprets relations as translations in embedding space:
//!
//! ```text
//! h + r ≈ t  (if the triple is true)
//! ```
//!
//! # Scoring
//!
//! score = ||h + r - t||_p with p in {1, 2}. Lower score = more plausible
//! triple; a perfect translation scores 0.
//!
//! # Embedding constraints
//!
//! - Entity rows are rescaled to unit L2 norm before every forward pass of
//!   the training objective, not just at initialization. Without this, the
//!   margin loss is trivially minimized by growing all norms.
//! - Relation rows are rescaled to unit L1 norm exactly once, at
//!   construction. Relations are deliberately *not* renormalized during
//!   training; doing so changes training dynamics.
//! - Each table carries one extra padding row at index `count` for
//!   out-of-vocabulary IDs. It keeps its random initialization forever:
//!   excluded from both normalizations and never updated by gradients.

use std::collections::HashMap;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::TripleBatch;
use crate::config::{ModelConfig, Norm};
use crate::error::{Error, Result};

/// Guard against division by a vanishing norm.
const NORM_EPS: f32 = 1e-8;

/// Per-example outputs of one forward pass of the training objective.
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    /// Margin ranking loss per example (no reduction; the caller averages).
    pub loss: Vec<f32>,
    /// Dissimilarity of each true triple.
    pub positive_distances: Vec<f32>,
    /// Dissimilarity of each corrupted triple.
    pub negative_distances: Vec<f32>,
}

/// TransE model: two dense embedding tables plus the translational scoring
/// rule and its margin-based training objective.
#[derive(Debug, Clone)]
pub struct TransE {
    config: ModelConfig,
    /// Entity embeddings, shape `(entity_count + 1, dim)`; last row is padding.
    entities: Array2<f32>,
    /// Relation embeddings, shape `(relation_count + 1, dim)`; last row is padding.
    relations: Array2<f32>,
}

impl TransE {
    /// Create a model with freshly initialized embeddings.
    ///
    /// Both tables are drawn uniformly from `[-6/sqrt(dim), 6/sqrt(dim)]`,
    /// then relation rows (padding excluded) are L1-normalized once.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let bound = 6.0 / (config.dim as f32).sqrt();

        let entities = Array2::from_shape_fn((config.entity_count + 1, config.dim), |_| {
            rng.gen_range(-bound..bound)
        });
        let relations = Array2::from_shape_fn((config.relation_count + 1, config.dim), |_| {
            rng.gen_range(-bound..bound)
        });

        let mut model = Self {
            config,
            entities,
            relations,
        };
        model.normalize_relations_once()?;
        Ok(model)
    }

    /// Reassemble a model from existing tables (checkpoint restore, tests).
    ///
    /// Tables are taken as-is: no normalization is applied, since relation
    /// rows were normalized when the tables were first built.
    pub fn from_parts(
        config: ModelConfig,
        entities: Array2<f32>,
        relations: Array2<f32>,
    ) -> Result<Self> {
        let expected_e = (config.entity_count + 1, config.dim);
        if entities.dim() != expected_e {
            return Err(Error::TableShape {
                table: "entity",
                expected: expected_e,
                actual: entities.dim(),
            });
        }
        let expected_r = (config.relation_count + 1, config.dim);
        if relations.dim() != expected_r {
            return Err(Error::TableShape {
                table: "relation",
                expected: expected_r,
                actual: relations.dim(),
            });
        }
        Ok(Self {
            config,
            entities,
            relations,
        })
    }

    /// Model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Number of entities (excluding the padding row).
    pub fn entity_count(&self) -> usize {
        self.config.entity_count
    }

    /// Number of relations (excluding the padding row).
    pub fn relation_count(&self) -> usize {
        self.config.relation_count
    }

    /// Embedding dimension.
    pub fn dim(&self) -> usize {
        self.config.dim
    }

    /// Full entity table including the padding row.
    pub fn entity_table(&self) -> ArrayView2<'_, f32> {
        self.entities.view()
    }

    /// Full relation table including the padding row.
    pub fn relation_table(&self) -> ArrayView2<'_, f32> {
        self.relations.view()
    }

    /// Entity rows without the padding row (the ranking candidate set).
    pub(crate) fn entity_rows(&self) -> ArrayView2<'_, f32> {
        self.entities.slice(s![..self.config.entity_count, ..])
    }

    /// Look up entity embeddings for a sequence of IDs.
    ///
    /// IDs up to and including the padding index `entity_count` are valid;
    /// anything beyond fails with [`Error::EntityOutOfRange`].
    pub fn embed_entities(&self, ids: &[usize]) -> Result<Array2<f32>> {
        for &id in ids {
            if id > self.config.entity_count {
                return Err(Error::EntityOutOfRange {
                    id,
                    count: self.config.entity_count,
                });
            }
        }
        Ok(self.entities.select(Axis(0), ids))
    }

    /// Look up relation embeddings for a sequence of IDs.
    pub fn embed_relations(&self, ids: &[usize]) -> Result<Array2<f32>> {
        for &id in ids {
            if id > self.config.relation_count {
                return Err(Error::RelationOutOfRange {
                    id,
                    count: self.config.relation_count,
                });
            }
        }
        Ok(self.relations.select(Axis(0), ids))
    }

    /// Rescale every entity row except the padding row to unit L2 norm.
    ///
    /// Invoked once per forward pass of the training objective, before
    /// scoring. A zero-norm row fails loudly instead of propagating NaN;
    /// rows are initialized away from zero, so hitting this means the
    /// tables were corrupted upstream.
    pub fn renormalize_entities(&mut self) -> Result<()> {
        for index in 0..self.config.entity_count {
            let mut row = self.entities.row_mut(index);
            let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm <= NORM_EPS {
                return Err(Error::DegenerateEmbedding {
                    table: "entity",
                    index,
                });
            }
            row.mapv_inplace(|x| x / norm);
        }
        Ok(())
    }

    /// One-time L1 normalization of relation rows (padding excluded).
    fn normalize_relations_once(&mut self) -> Result<()> {
        for index in 0..self.config.relation_count {
            let mut row = self.relations.row_mut(index);
            let norm = row.iter().map(|x| x.abs()).sum::<f32>();
            if norm <= NORM_EPS {
                return Err(Error::DegenerateEmbedding {
                    table: "relation",
                    index,
                });
            }
            row.mapv_inplace(|x| x / norm);
        }
        Ok(())
    }

    /// Dissimilarity scores for a batch of triples.
    ///
    /// `score_i = ||h_i + r_i - t_i||_p`. Pure: no side effects, used
    /// identically on true triples, corrupted triples, and evaluation
    /// candidates. Each score depends only on its own triple, never on
    /// batch position.
    pub fn scores(&self, batch: &TripleBatch) -> Result<Vec<f32>> {
        let h = self.embed_entities(batch.heads())?;
        let r = self.embed_relations(batch.relations())?;
        let t = self.embed_entities(batch.tails())?;

        let diff = &h + &r - &t;
        Ok(diff
            .axis_iter(Axis(0))
            .map(|row| norm_of(self.config.norm, row))
            .collect())
    }

    /// Forward pass of the training objective.
    ///
    /// Renormalizes entities, scores the true and corrupted batches, and
    /// returns the per-example margin ranking loss
    /// `max(0, margin + positive - negative)` together with both distance
    /// vectors for observability. No reduction is applied.
    pub fn forward(
        &mut self,
        positive: &TripleBatch,
        negative: &TripleBatch,
    ) -> Result<ForwardOutput> {
        if positive.len() != negative.len() {
            return Err(Error::BatchLength {
                expected: positive.len(),
                actual: negative.len(),
            });
        }

        self.renormalize_entities()?;

        let positive_distances = self.scores(positive)?;
        let negative_distances = self.scores(negative)?;
        let margin = self.config.margin;
        let loss = positive_distances
            .iter()
            .zip(&negative_distances)
            .map(|(&p, &n)| (margin + p - n).max(0.0))
            .collect();

        Ok(ForwardOutput {
            loss,
            positive_distances,
            negative_distances,
        })
    }

    /// Apply one SGD step of the margin ranking loss.
    ///
    /// `loss` is the per-example loss from [`TransE::forward`] on the same
    /// pair of batches, with the tables unchanged in between. Gradients are
    /// accumulated over the whole batch and applied at once, so every row
    /// that participated is updated exactly once and rows outside the batch
    /// are untouched.
    pub fn apply_margin_gradients(
        &mut self,
        positive: &TripleBatch,
        negative: &TripleBatch,
        loss: &[f32],
        learning_rate: f32,
    ) -> Result<()> {
        if positive.len() != negative.len() {
            return Err(Error::BatchLength {
                expected: positive.len(),
                actual: negative.len(),
            });
        }
        if loss.len() != positive.len() {
            return Err(Error::BatchLength {
                expected: positive.len(),
                actual: loss.len(),
            });
        }

        let mut entity_grads: HashMap<usize, Array1<f32>> = HashMap::new();
        let mut relation_grads: HashMap<usize, Array1<f32>> = HashMap::new();

        for i in 0..loss.len() {
            // Examples already satisfying the margin contribute no gradient.
            if loss[i] <= 0.0 {
                continue;
            }

            let (hp, rp, tp) = positive.get(i);
            let (hn, rn, tn) = negative.get(i);

            // d loss / d positive_distance = +1
            let unit_p = self.distance_gradient(hp, rp, tp);
            accumulate(&mut entity_grads, hp, &unit_p, 1.0);
            accumulate(&mut entity_grads, tp, &unit_p, -1.0);
            accumulate(&mut relation_grads, rp, &unit_p, 1.0);

            // d loss / d negative_distance = -1
            let unit_n = self.distance_gradient(hn, rn, tn);
            accumulate(&mut entity_grads, hn, &unit_n, -1.0);
            accumulate(&mut entity_grads, tn, &unit_n, 1.0);
            accumulate(&mut relation_grads, rn, &unit_n, -1.0);
        }

        for (id, grad) in &entity_grads {
            self.entities.row_mut(*id).scaled_add(-learning_rate, grad);
        }
        for (id, grad) in &relation_grads {
            self.relations.row_mut(*id).scaled_add(-learning_rate, grad);
        }

        Ok(())
    }

    /// Gradient of `||h + r - t||_p` with respect to `h + r - t`.
    fn distance_gradient(&self, h: usize, r: usize, t: usize) -> Array1<f32> {
        let diff: Array1<f32> =
            &self.entities.row(h) + &self.relations.row(r) - &self.entities.row(t);
        match self.config.norm {
            Norm::L1 => diff.mapv(sign),
            Norm::L2 => {
                let dist = diff.iter().map(|x| x * x).sum::<f32>().sqrt().max(NORM_EPS);
                diff.mapv(|x| x / dist)
            }
        }
    }
}

/// p-norm of one embedding-space difference vector.
pub(crate) fn norm_of(norm: Norm, v: ArrayView1<'_, f32>) -> f32 {
    match norm {
        Norm::L1 => v.iter().map(|x| x.abs()).sum(),
        Norm::L2 => v.iter().map(|x| x * x).sum::<f32>().sqrt(),
    }
}

/// Subgradient convention for |x| at zero: 0.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn accumulate(grads: &mut HashMap<usize, Array1<f32>>, id: usize, unit: &Array1<f32>, scale: f32) {
    grads
        .entry(id)
        .and_modify(|g| g.scaled_add(scale, unit))
        .or_insert_with(|| unit * scale);
}
