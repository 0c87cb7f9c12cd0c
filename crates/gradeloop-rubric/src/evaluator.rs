use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

use gradeloop_oracle::{OracleError, OracleRequest, RetryPolicy, TextOracle};

use crate::{CalibrationCurve, EvaluationPrompts, GradeResult, Rubric};

/// Metadata the grader needs about the content under evaluation.
#[derive(Debug, Clone)]
pub struct ContentMetadata {
    pub grade_level: u8,
    pub subject: String,
    pub tags: Vec<String>,
}

impl ContentMetadata {
    pub fn new(grade_level: u8, subject: impl Into<String>) -> Self {
        Self {
            grade_level,
            subject: subject.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A single criterion's scoring failed. Recovered locally: the
/// criterion gets a raw 0.0 and a synthetic critical issue, and the
/// evaluation continues.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Completion is not a valid judgment object: {0}")]
    InvalidJudgment(String),
}

/// The strict response schema required from the grader, one object per
/// criterion. Free-text scraping is deliberately not supported; a
/// response that does not parse fails this criterion explicitly.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CriterionJudgment {
    pub score: f64,
    pub justification: String,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl CriterionJudgment {
    /// Parse a completion into a judgment.
    ///
    /// Accepts a bare JSON object or one wrapped in a ```json fence;
    /// anything else is invalid. Scores are clamped into [0, 1].
    pub fn parse(completion: &str) -> Result<Self, EvaluationError> {
        let body = strip_code_fence(completion.trim());
        let mut judgment: CriterionJudgment = serde_json::from_str(body)
            .map_err(|e| EvaluationError::InvalidJudgment(e.to_string()))?;
        if !judgment.score.is_finite() {
            return Err(EvaluationError::InvalidJudgment(format!(
                "non-finite score {}",
                judgment.score
            )));
        }
        judgment.score = judgment.score.clamp(0.0, 1.0);
        Ok(judgment)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Grades content against a rubric via the text oracle.
///
/// Immutable configuration (rubric, model, temperature) is fixed at
/// construction; the calibration curve is a hot-swappable snapshot so
/// concurrent evaluations always see one consistent curve.
pub struct RubricEvaluator {
    oracle: Arc<dyn TextOracle>,
    retry: RetryPolicy,
    rubric: Rubric,
    curve: RwLock<Arc<CalibrationCurve>>,
    model: String,
    temperature: f64,
    interrupted: Arc<AtomicBool>,
}

impl RubricEvaluator {
    pub fn new(oracle: Arc<dyn TextOracle>, rubric: Rubric) -> Self {
        Self {
            oracle,
            retry: RetryPolicy::default(),
            rubric,
            curve: RwLock::new(Arc::new(CalibrationCurve::empty())),
            model: "gpt-4".to_string(),
            // Low temperature for consistent grading.
            temperature: 0.1,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_curve(self, curve: CalibrationCurve) -> Self {
        self.set_curve(curve);
        self
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Handle to signal cancellation; checked before each oracle call.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// The curve snapshot current evaluations will use.
    pub fn curve_snapshot(&self) -> Arc<CalibrationCurve> {
        self.curve.read().expect("curve lock poisoned").clone()
    }

    /// Atomically swap in a new calibration curve.
    pub fn set_curve(&self, curve: CalibrationCurve) {
        if curve.is_stale_for(self.rubric.global_pass_threshold()) {
            warn!(
                curve_threshold = curve.pass_threshold,
                rubric_threshold = self.rubric.global_pass_threshold(),
                "Calibration curve was computed against a different pass threshold"
            );
        }
        *self.curve.write().expect("curve lock poisoned") = Arc::new(curve);
    }

    /// Grade content with calibration applied.
    pub async fn evaluate(&self, content: &str, metadata: &ContentMetadata) -> GradeResult {
        let curve = self.curve_snapshot();
        self.evaluate_with_curve(content, metadata, &curve, self.temperature)
            .await
    }

    /// Grade content with all offsets zeroed and temperature 0, for
    /// calibration batch jobs.
    pub async fn evaluate_raw(&self, content: &str, metadata: &ContentMetadata) -> GradeResult {
        self.evaluate_with_curve(content, metadata, &CalibrationCurve::empty(), 0.0)
            .await
    }

    async fn evaluate_with_curve(
        &self,
        content: &str,
        metadata: &ContentMetadata,
        curve: &CalibrationCurve,
        temperature: f64,
    ) -> GradeResult {
        let mut raw_scores = BTreeMap::new();
        let mut feedback = BTreeMap::new();
        let mut critical_issues = Vec::new();

        for criterion in self.rubric.criteria() {
            if self.interrupted.load(Ordering::SeqCst) {
                warn!(criterion = %criterion.name, "Evaluation interrupted before oracle call");
                record_failure(
                    &criterion.name,
                    &mut raw_scores,
                    &mut feedback,
                    &mut critical_issues,
                );
                continue;
            }

            match self.score_criterion(criterion, content, metadata, temperature).await {
                Ok(judgment) => {
                    debug!(
                        criterion = %criterion.name,
                        score = judgment.score,
                        issues = judgment.issues.len(),
                        "Criterion scored"
                    );
                    raw_scores.insert(criterion.name.clone(), judgment.score);
                    feedback.insert(criterion.name.clone(), judgment.justification);
                    critical_issues.extend(judgment.issues);
                }
                Err(e) => {
                    // One bad criterion must not mask the others.
                    warn!(criterion = %criterion.name, error = %e, "Criterion scoring failed");
                    record_failure(
                        &criterion.name,
                        &mut raw_scores,
                        &mut feedback,
                        &mut critical_issues,
                    );
                }
            }
        }

        GradeResult::compute(&self.rubric, &raw_scores, feedback, critical_issues, curve)
    }

    async fn score_criterion(
        &self,
        criterion: &crate::RubricCriterion,
        content: &str,
        metadata: &ContentMetadata,
        temperature: f64,
    ) -> Result<CriterionJudgment, EvaluationError> {
        let prompt = EvaluationPrompts::criterion_prompt(criterion, content, metadata);
        let request = OracleRequest::new(EvaluationPrompts::GRADER_SYSTEM_PROMPT, prompt)
            .with_model(&self.model)
            .with_temperature(temperature)
            .with_max_tokens(800);

        let completion = self.retry.complete(self.oracle.as_ref(), &request).await?;
        CriterionJudgment::parse(&completion)
    }
}

fn record_failure(
    criterion: &str,
    raw_scores: &mut BTreeMap<String, f64>,
    feedback: &mut BTreeMap<String, String>,
    critical_issues: &mut Vec<String>,
) {
    raw_scores.insert(criterion.to_string(), 0.0);
    feedback.insert(
        criterion.to_string(),
        "Scoring failed for this criterion.".to_string(),
    );
    critical_issues.push(format!("evaluation error: {criterion}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_judgment_object() {
        let judgment = CriterionJudgment::parse(
            r#"{"score": 0.9, "justification": "Clear and direct.", "issues": []}"#,
        )
        .unwrap();
        assert_eq!(judgment.score, 0.9);
        assert!(judgment.issues.is_empty());
    }

    #[test]
    fn parses_fenced_judgment_object() {
        let completion = "```json\n{\"score\": 0.4, \"justification\": \"Vague.\", \"issues\": [\"Missing steps\"]}\n```";
        let judgment = CriterionJudgment::parse(completion).unwrap();
        assert_eq!(judgment.score, 0.4);
        assert_eq!(judgment.issues, vec!["Missing steps".to_string()]);
    }

    #[test]
    fn rejects_free_text() {
        let err = CriterionJudgment::parse("Score: 0.8\nJustification: fine").unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidJudgment(_)));
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let judgment =
            CriterionJudgment::parse(r#"{"score": 1.4, "justification": "x"}"#).unwrap();
        assert_eq!(judgment.score, 1.0);
    }
}
