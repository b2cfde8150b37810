//! End-to-end training and evaluation on toy graphs.

use trellis_kge::{
    evaluate, ModelConfig, Norm, NullSink, TrainingConfig, Trainer, TransE, TripleBatch,
};

/// 4 entities, 1 relation, 3 true triples.
fn toy_graph() -> Vec<TripleBatch> {
    vec![TripleBatch::from_triples(&[(0, 0, 1), (1, 0, 2), (2, 0, 3)])]
}

#[test]
fn training_reduces_loss_on_average() {
    let config = ModelConfig::new(4, 1).with_dim(16).with_seed(1234);
    let model = TransE::new(config).unwrap();
    let mut trainer = Trainer::new(
        model,
        TrainingConfig::default()
            .with_learning_rate(0.01)
            .with_epochs(200),
    );

    let batches = toy_graph();
    let mut sink = NullSink;
    let history = trainer.fit(&batches, &mut sink).unwrap();
    assert_eq!(history.len(), 200);

    // Monotone on average, not per step: compare the first and last ten
    // epoch means.
    let early: f32 = history[..10].iter().map(|s| s.mean_loss).sum::<f32>() / 10.0;
    let late: f32 = history[190..].iter().map(|s| s.mean_loss).sum::<f32>() / 10.0;
    assert!(
        late < early,
        "mean loss should fall: early {early}, late {late}"
    );

    for stats in &history {
        assert!(stats.mean_loss.is_finite());
        assert!((0.0..=100.0).contains(&stats.loss_impacting_pct));
    }
}

#[test]
fn trained_model_beats_nothing_at_link_prediction() {
    let config = ModelConfig::new(4, 1)
        .with_dim(16)
        .with_norm(Norm::L2)
        .with_seed(7);
    let model = TransE::new(config).unwrap();
    let mut trainer = Trainer::new(
        model,
        TrainingConfig::default()
            .with_learning_rate(0.01)
            .with_epochs(300),
    );

    let batches = toy_graph();
    let mut sink = NullSink;
    trainer.fit(&batches, &mut sink).unwrap();

    let report = evaluate(trainer.model(), &batches).unwrap();

    // Two rankings per triple.
    assert_eq!(report.rankings, 6);
    // With 4 entities every rank is <= 4, so Hits@10 must saturate. This is
    // the trivial floor; it mostly checks the plumbing end to end.
    assert!((report.hits_at_10 - 100.0).abs() < 1e-9);
    assert!(report.mrr > 0.0 && report.mrr <= 100.0);
    assert!(report.hits_at_1 >= 0.0);
}

#[test]
fn evaluator_is_idempotent_across_calls() {
    let config = ModelConfig::new(6, 2).with_dim(12).with_seed(99);
    let model = TransE::new(config).unwrap();
    let mut trainer = Trainer::new(
        model,
        TrainingConfig::default()
            .with_learning_rate(0.02)
            .with_epochs(20),
    );

    let train = vec![TripleBatch::from_triples(&[
        (0, 0, 1),
        (1, 1, 2),
        (2, 0, 3),
        (3, 1, 4),
        (4, 0, 5),
    ])];
    let held_out = vec![
        TripleBatch::from_triples(&[(0, 0, 2), (1, 0, 3)]),
        TripleBatch::from_triples(&[(5, 1, 0)]),
    ];

    let mut sink = NullSink;
    trainer.fit(&train, &mut sink).unwrap();

    let first = evaluate(trainer.model(), &held_out).unwrap();
    let second = evaluate(trainer.model(), &held_out).unwrap();
    assert_eq!(first, second);
}

#[test]
fn validation_drives_best_score_and_snapshot() {
    let config = ModelConfig::new(4, 1).with_dim(8).with_seed(5);
    let model = TransE::new(config).unwrap();
    let mut trainer = Trainer::new(
        model,
        TrainingConfig::default()
            .with_learning_rate(0.01)
            .with_epochs(10),
    );

    let batches = toy_graph();
    let mut sink = NullSink;
    trainer.fit(&batches, &mut sink).unwrap();

    let report = evaluate(trainer.model(), &batches).unwrap();
    assert!(trainer.record_validation(&report));
    assert!((trainer.best_score() - report.hits_at_10).abs() < 1e-9);

    // Snapshot -> restore -> identical evaluation metrics.
    let snapshot = trainer.snapshot();
    let restored = Trainer::restore(snapshot, TrainingConfig::default()).unwrap();
    let again = evaluate(restored.model(), &batches).unwrap();
    assert_eq!(report, again);
    assert_eq!(restored.epoch(), trainer.epoch());
    assert_eq!(restored.step(), trainer.step());
    assert!((restored.best_score() - trainer.best_score()).abs() < 1e-9);
}
