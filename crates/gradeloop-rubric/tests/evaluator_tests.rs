use std::collections::BTreeMap;
use std::sync::Arc;

use gradeloop_oracle::{OracleError, RetryPolicy, ScriptedOracle};
use gradeloop_rubric::{
    CalibrationCurve, ContentMetadata, ImprovementBrief, Rubric, RubricCriterion, RubricEvaluator,
};

fn judgment(score: f64, justification: &str, issues: &[&str]) -> Result<String, OracleError> {
    let issues: Vec<String> = issues.iter().map(|s| s.to_string()).collect();
    Ok(serde_json::json!({
        "score": score,
        "justification": justification,
        "issues": issues,
    })
    .to_string())
}

fn four_criterion_rubric() -> Rubric {
    Rubric::new(
        vec![
            RubricCriterion::new("completeness", "All parts present").critical(),
            RubricCriterion::new("answer_quality", "Plausible answers"),
            RubricCriterion::new("explanation_quality", "Educational explanations"),
            RubricCriterion::new("language_quality", "Grade-level language"),
        ],
        0.85,
    )
    .unwrap()
}

fn metadata() -> ContentMetadata {
    ContentMetadata::new(4, "Language Arts")
}

#[tokio::test]
async fn one_oracle_call_per_criterion() {
    let oracle = Arc::new(ScriptedOracle::always(
        r#"{"score": 0.95, "justification": "Good.", "issues": []}"#,
    ));
    let evaluator = RubricEvaluator::new(oracle.clone(), four_criterion_rubric());

    let result = evaluator.evaluate("A question.", &metadata()).await;
    assert!(result.passed);
    assert_eq!(oracle.calls(), 4);
    assert_eq!(result.scores.len(), 4);
}

#[tokio::test]
async fn reported_issue_fails_high_scoring_content() {
    // Scenario: every score is excellent but one criterion reports an
    // issue. The conjunctive gate must fail the result.
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.98, "Complete.", &[]),
        judgment(0.97, "Strong answers.", &["two options are both defensible"]),
        judgment(0.96, "Thorough.", &[]),
        judgment(0.95, "Appropriate.", &[]),
    ]));
    let evaluator = RubricEvaluator::new(oracle, four_criterion_rubric());

    let result = evaluator.evaluate("A question.", &metadata()).await;
    assert!(result.overall_score > 0.9);
    assert_eq!(
        result.critical_issues,
        vec!["two options are both defensible".to_string()]
    );
    assert!(!result.passed);
}

#[tokio::test]
async fn parse_failure_isolated_to_one_criterion() {
    // One criterion returns free text instead of the JSON schema; the
    // other three must still carry valid scores.
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.9, "Complete.", &[]),
        Ok("Score: 0.8 — looks fine to me".to_string()),
        judgment(0.92, "Thorough.", &[]),
        judgment(0.91, "Appropriate.", &[]),
    ]));
    let evaluator = RubricEvaluator::new(oracle, four_criterion_rubric());

    let result = evaluator.evaluate("A question.", &metadata()).await;
    assert!(!result.passed);
    assert_eq!(
        result.score_for("answer_quality").unwrap().raw_score,
        0.0
    );
    assert_eq!(result.score_for("completeness").unwrap().raw_score, 0.9);
    assert_eq!(result.score_for("explanation_quality").unwrap().raw_score, 0.92);
    assert_eq!(result.score_for("language_quality").unwrap().raw_score, 0.91);
    assert!(result
        .critical_issues
        .iter()
        .any(|issue| issue == "evaluation error: answer_quality"));
}

#[tokio::test]
async fn oracle_failure_isolated_to_one_criterion() {
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.9, "Complete.", &[]),
        Err(OracleError::ServiceError("boom".to_string())),
        judgment(0.92, "Thorough.", &[]),
        judgment(0.91, "Appropriate.", &[]),
    ]));
    let evaluator = RubricEvaluator::new(oracle, four_criterion_rubric())
        .with_retry(RetryPolicy::immediate(1));

    let result = evaluator.evaluate("A question.", &metadata()).await;
    assert!(!result.passed);
    assert!(result
        .critical_issues
        .iter()
        .any(|issue| issue == "evaluation error: answer_quality"));
    assert_eq!(result.score_for("explanation_quality").unwrap().raw_score, 0.92);
}

#[tokio::test]
async fn curve_swap_changes_subsequent_evaluations() {
    let oracle = Arc::new(ScriptedOracle::always(
        r#"{"score": 0.80, "justification": "Decent.", "issues": []}"#,
    ));
    let evaluator = RubricEvaluator::new(oracle, four_criterion_rubric());

    let before = evaluator.evaluate("A question.", &metadata()).await;
    assert!(!before.passed);

    let mut offsets = BTreeMap::new();
    for name in ["completeness", "answer_quality", "explanation_quality", "language_quality"] {
        offsets.insert(name.to_string(), 0.10);
    }
    evaluator.set_curve(CalibrationCurve::new(offsets, 20, 0.85));

    let after = evaluator.evaluate("A question.", &metadata()).await;
    assert!(after.passed);
    for score in after.scores.values() {
        assert!((score.calibrated_score - 0.90).abs() < 1e-9);
        assert!(score.calibrated_score >= score.raw_score);
    }
}

#[tokio::test]
async fn raw_evaluation_ignores_curve_and_uses_temperature_zero() {
    let oracle = Arc::new(ScriptedOracle::always(
        r#"{"score": 0.7, "justification": "Mediocre.", "issues": []}"#,
    ));
    let mut offsets = BTreeMap::new();
    offsets.insert("completeness".to_string(), 0.2);
    let evaluator = RubricEvaluator::new(oracle.clone(), four_criterion_rubric())
        .with_curve(CalibrationCurve::new(offsets, 20, 0.85));

    let result = evaluator.evaluate_raw("A question.", &metadata()).await;
    assert_eq!(result.score_for("completeness").unwrap().calibrated_score, 0.7);
    for request in oracle.requests() {
        assert_eq!(request.temperature, 0.0);
    }
}

#[tokio::test]
async fn brief_orders_failures_worst_first() {
    let oracle = Arc::new(ScriptedOracle::new(vec![
        judgment(0.95, "Complete.", &[]),
        judgment(0.40, "Weak distractors.", &[]),
        judgment(0.60, "Shallow.", &[]),
        judgment(0.90, "Fine.", &[]),
    ]));
    let evaluator = RubricEvaluator::new(oracle, four_criterion_rubric());

    let result = evaluator.evaluate("A question.", &metadata()).await;
    let brief = ImprovementBrief::extract(evaluator.rubric(), &result);
    let names: Vec<&str> = brief
        .failing_criteria
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["answer_quality", "explanation_quality"]);
    assert!(brief.render().contains("Answer Quality (0.40)"));
}
