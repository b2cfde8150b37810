//! Negative sample generation by triple corruption.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::TripleBatch;

/// Generates one corrupted triple per true triple.
///
/// For each input triple a fair coin decides whether the head or the tail is
/// replaced by a uniformly drawn entity; the relation is never corrupted and
/// exactly one position changes. The replacement is drawn uniformly from all
/// entities *except* the one being replaced, so the corrupted triple always
/// differs from its paired input. It may still coincide with another true
/// triple in the dataset; that label noise is accepted, not filtered.
#[derive(Debug)]
pub struct NegativeSampler {
    entity_count: usize,
    rng: StdRng,
}

impl NegativeSampler {
    /// Create a sampler over `entity_count` entities with a fixed seed.
    pub fn new(entity_count: usize, seed: u64) -> Self {
        Self {
            entity_count,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Corrupt a batch of true triples, one corruption per triple.
    pub fn corrupt(&mut self, batch: &TripleBatch) -> TripleBatch {
        let mut corrupted = TripleBatch::default();
        for (head, relation, tail) in batch.iter() {
            if self.rng.gen_bool(0.5) {
                corrupted.push(self.replacement(head), relation, tail);
            } else {
                corrupted.push(head, relation, self.replacement(tail));
            }
        }
        corrupted
    }

    /// Uniform draw from `[0, entity_count)` excluding `original`.
    ///
    /// With fewer than two entities no distinct replacement exists; the
    /// original is returned unchanged.
    fn replacement(&mut self, original: usize) -> usize {
        if self.entity_count < 2 {
            return original;
        }
        let draw = self.rng.gen_range(0..self.entity_count - 1);
        if draw >= original {
            draw + 1
        } else {
            draw
        }
    }
}
