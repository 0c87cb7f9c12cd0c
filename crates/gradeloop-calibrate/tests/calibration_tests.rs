use std::sync::Arc;

use gradeloop_calibrate::{validate_mutations, CalibrationError, Calibrator, CurveStore};
use gradeloop_mutate::{MutationGenerator, MutationType};
use gradeloop_oracle::{OracleError, ScriptedOracle};
use gradeloop_rubric::{
    ContentMetadata, Exemplar, InMemoryExemplarStore, QualityStatus, Rubric, RubricCriterion,
    RubricEvaluator,
};

fn judgment(score: f64) -> Result<String, OracleError> {
    Ok(format!(
        r#"{{"score": {score}, "justification": "graded", "issues": []}}"#
    ))
}

/// Single critical criterion, global pass bar 0.85.
fn completeness_rubric() -> Rubric {
    let mut criterion = RubricCriterion::new("completeness", "All parts present")
        .critical()
        .with_weight(1.0);
    criterion.critical_threshold = 0.85;
    Rubric::new(vec![criterion], 0.85).unwrap()
}

fn exemplars(n: usize) -> Vec<Exemplar> {
    (0..n)
        .map(|i| Exemplar::new(format!("ex-{i}"), format!("exemplar text {i}")))
        .collect()
}

#[tokio::test]
async fn offset_is_threshold_minus_mean() {
    // Raw scores 0.70, 0.75, 0.80 against a 0.85 bar: offset 0.10.
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.70),
        judgment(0.75),
        judgment(0.80),
    ]));
    let evaluator = RubricEvaluator::new(oracle, completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(3);

    let curve = calibrator.calibrate(&exemplars(3)).await.unwrap();
    assert!((curve.offset_for("completeness") - 0.10).abs() < 1e-9);
    assert_eq!(curve.computed_from, 3);
    assert_eq!(curve.pass_threshold, 0.85);
}

#[tokio::test]
async fn generous_grader_gets_zero_offset() {
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.95),
        judgment(0.90),
        judgment(0.97),
    ]));
    let evaluator = RubricEvaluator::new(oracle, completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(3);

    let curve = calibrator.calibrate(&exemplars(3)).await.unwrap();
    // Offsets never go negative: calibration cannot make passing harder.
    assert_eq!(curve.offset_for("completeness"), 0.0);
}

#[tokio::test]
async fn too_few_exemplars_skips_calibration() {
    let oracle = Arc::new(ScriptedOracle::new(vec![judgment(0.7)]));
    let evaluator = RubricEvaluator::new(oracle.clone(), completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(10);

    let err = calibrator.calibrate(&exemplars(4)).await.unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::TooFewExemplars { have: 4, need: 10 }
    ));
    // The guard fires before any grading happens.
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn calibration_is_idempotent_on_frozen_scores() {
    // Two passes over the same exemplars with identical grader output
    // must produce identical offsets.
    let script: Vec<_> = [0.70, 0.75, 0.80, 0.70, 0.75, 0.80]
        .iter()
        .map(|s| judgment(*s))
        .collect();
    let oracle = Arc::new(ScriptedOracle::new(script));
    let evaluator = RubricEvaluator::new(oracle, completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(3);

    let first = calibrator.calibrate(&exemplars(3)).await.unwrap();
    let second = calibrator.calibrate(&exemplars(3)).await.unwrap();
    assert!(
        (first.offset_for("completeness") - second.offset_for("completeness")).abs() < 1e-9
    );
}

#[tokio::test]
async fn calibrate_from_store_uses_good_exemplars_only() {
    let oracle = Arc::new(ScriptedOracle::new(vec![judgment(0.75)]));
    let evaluator = RubricEvaluator::new(oracle.clone(), completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(2);

    let mut store = InMemoryExemplarStore::new();
    store.insert(QualityStatus::Good, Exemplar::new("g1", "good"));
    store.insert(QualityStatus::Good, Exemplar::new("g2", "good"));
    store.insert(QualityStatus::Bad, Exemplar::new("b1", "bad"));

    let curve = calibrator.calibrate_from_store(&store).await.unwrap();
    assert_eq!(curve.computed_from, 2);
    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn batch_job_keeps_prior_curve_when_sample_too_small() {
    // Load prior, try to recalibrate, fall back to the prior curve on
    // TooFewExemplars.
    let dir = tempfile::tempdir().unwrap();
    let store = CurveStore::new(dir.path().join("curve.json"));

    let mut offsets = std::collections::BTreeMap::new();
    offsets.insert("completeness".to_string(), 0.08);
    let prior = gradeloop_calibrate::CalibrationCurve::new(offsets, 30, 0.85);
    store.save(&prior).unwrap();

    let oracle = Arc::new(ScriptedOracle::new(vec![judgment(0.5)]));
    let evaluator = RubricEvaluator::new(oracle, completeness_rubric());
    let calibrator = Calibrator::new(&evaluator).with_min_samples(10);

    let curve = match calibrator.calibrate(&exemplars(2)).await {
        Ok(fresh) => fresh,
        Err(CalibrationError::TooFewExemplars { .. }) => store.load().unwrap(),
        Err(e) => panic!("unexpected error: {e}"),
    };
    assert_eq!(curve, prior);
}

#[tokio::test]
async fn mutation_validation_detects_targeted_failure() {
    let rubric = Rubric::default_article();

    // Generate one mutation with a scripted rewrite.
    let mutation_oracle = Arc::new(ScriptedOracle::always("A subtly wrong article."));
    let generator = MutationGenerator::new(mutation_oracle, rubric.clone());
    let record = generator
        .mutate(&Exemplar::new("ex-1", "A good article."), MutationType::ContentAccuracy)
        .await
        .unwrap();

    // Grade it: content_accuracy scores low, everything else high.
    let grading_oracle = Arc::new(ScriptedOracle::new(
        rubric
            .criteria()
            .iter()
            .map(|c| {
                if c.name == "content_accuracy" {
                    judgment(0.15)
                } else {
                    judgment(0.95)
                }
            })
            .collect(),
    ));
    let evaluator = RubricEvaluator::new(grading_oracle, rubric);

    let report = validate_mutations(
        &evaluator,
        &ContentMetadata::new(4, "Language Arts"),
        std::slice::from_ref(&record),
    )
    .await;

    assert_eq!(report.checks.len(), 1);
    assert!(report.checks[0].target_detected);
    assert!(report.checks[0].collateral.is_empty());
    assert_eq!(report.discrimination_rate(), 1.0);
}
