//! Property-based tests for the embedding model and sampler.
//!
//! These verify invariants that must hold for all inputs, not just the
//! hand-picked cases in the unit tests:
//! - corruption changes exactly one of head/tail and never the relation
//! - scores depend only on a triple's own IDs, never on batch position
//! - the margin loss matches its closed form exactly in both branches

use proptest::prelude::*;

use trellis_kge::{ModelConfig, NegativeSampler, Norm, TransE, TripleBatch};

const ENTITIES: usize = 12;
const RELATIONS: usize = 3;

fn arb_triple() -> impl Strategy<Value = (usize, usize, usize)> {
    (0..ENTITIES, 0..RELATIONS, 0..ENTITIES)
}

fn arb_batch() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
    prop::collection::vec(arb_triple(), 1..40)
}

fn test_model(norm: Norm, seed: u64) -> TransE {
    TransE::new(
        ModelConfig::new(ENTITIES, RELATIONS)
            .with_dim(10)
            .with_norm(norm)
            .with_seed(seed),
    )
    .unwrap()
}

mod sampler_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn corruption_changes_exactly_one_position(
            triples in arb_batch(),
            seed in any::<u64>(),
        ) {
            let batch = TripleBatch::from_triples(&triples);
            let mut sampler = NegativeSampler::new(ENTITIES, seed);
            let corrupted = sampler.corrupt(&batch);

            prop_assert_eq!(corrupted.len(), batch.len());
            for ((h, r, t), (bh, br, bt)) in batch.iter().zip(corrupted.iter()) {
                prop_assert_eq!(r, br);
                prop_assert!((h != bh) ^ (t != bt));
                prop_assert!(bh < ENTITIES);
                prop_assert!(bt < ENTITIES);
            }
        }
    }
}

mod scoring_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn score_ignores_batch_position(
            triples in arb_batch(),
            seed in any::<u64>(),
        ) {
            let model = test_model(Norm::L2, seed);

            let batch = TripleBatch::from_triples(&triples);
            let mut reversed = triples.clone();
            reversed.reverse();
            let reversed = TripleBatch::from_triples(&reversed);

            let forward = model.scores(&batch).unwrap();
            let backward = model.scores(&reversed).unwrap();

            for (i, &score) in forward.iter().enumerate() {
                let mirrored = backward[backward.len() - 1 - i];
                prop_assert!((score - mirrored).abs() < 1e-6);
            }
        }

        #[test]
        fn scores_are_non_negative(
            triples in arb_batch(),
            seed in any::<u64>(),
            l1 in any::<bool>(),
        ) {
            let norm = if l1 { Norm::L1 } else { Norm::L2 };
            let model = test_model(norm, seed);
            let batch = TripleBatch::from_triples(&triples);

            for score in model.scores(&batch).unwrap() {
                prop_assert!(score >= 0.0);
                prop_assert!(score.is_finite());
            }
        }
    }
}

mod loss_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn margin_loss_matches_closed_form(
            positive in arb_batch(),
            corruption_seed in any::<u64>(),
            seed in any::<u64>(),
        ) {
            let mut model = test_model(Norm::L1, seed);
            let margin = model.config().margin;

            let positive = TripleBatch::from_triples(&positive);
            let mut sampler = NegativeSampler::new(ENTITIES, corruption_seed);
            let negative = sampler.corrupt(&positive);

            let out = model.forward(&positive, &negative).unwrap();
            for i in 0..positive.len() {
                let p = out.positive_distances[i];
                let n = out.negative_distances[i];
                if p + margin <= n {
                    prop_assert!(out.loss[i] == 0.0);
                } else {
                    let expected = p - n + margin;
                    prop_assert!((out.loss[i] - expected).abs() < 1e-6);
                }
            }
        }
    }
}
