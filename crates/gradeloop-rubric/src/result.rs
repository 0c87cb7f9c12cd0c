use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{CalibrationCurve, Rubric};

/// Score for one criterion, before and after calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub raw_score: f64,
    pub calibrated_score: f64,
    /// Whether the calibrated score clears this criterion's
    /// effective threshold.
    pub passed: bool,
}

/// The full outcome of grading one piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResult {
    pub scores: BTreeMap<String, CriterionScore>,
    /// Weight-normalized sum of calibrated scores.
    pub overall_score: f64,
    pub critical_issues: Vec<String>,
    pub passed: bool,
    /// Per-criterion grader justification.
    pub feedback: BTreeMap<String, String>,
    pub graded_at: DateTime<Utc>,
}

impl GradeResult {
    /// Fold per-criterion raw scores into a result.
    ///
    /// The pass verdict is conjunctive: the weighted average must clear
    /// the global threshold, every criterion must clear its own
    /// effective threshold, and the critical-issue list must be empty.
    /// A high average never overrides a single failing criterion.
    pub fn compute(
        rubric: &Rubric,
        raw_scores: &BTreeMap<String, f64>,
        feedback: BTreeMap<String, String>,
        critical_issues: Vec<String>,
        curve: &CalibrationCurve,
    ) -> Self {
        let mut scores = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut all_criteria_pass = true;

        for criterion in rubric.criteria() {
            let raw = raw_scores
                .get(&criterion.name)
                .copied()
                .unwrap_or(0.0)
                .clamp(0.0, 1.0);
            let calibrated = curve.apply(&criterion.name, raw);
            let passed = calibrated >= criterion.effective_threshold();
            all_criteria_pass &= passed;
            weighted_sum += criterion.weight * calibrated;
            scores.insert(
                criterion.name.clone(),
                CriterionScore {
                    raw_score: raw,
                    calibrated_score: calibrated,
                    passed,
                },
            );
        }

        let total_weight = rubric.total_weight();
        let overall_score = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        };

        let passed = overall_score >= rubric.global_pass_threshold()
            && all_criteria_pass
            && critical_issues.is_empty();

        Self {
            scores,
            overall_score,
            critical_issues,
            passed,
            feedback,
            graded_at: Utc::now(),
        }
    }

    pub fn score_for(&self, criterion: &str) -> Option<&CriterionScore> {
        self.scores.get(criterion)
    }

    /// Mean calibrated score over the rubric's critical criteria.
    /// Used for tie-breaking between near-equal candidates.
    pub fn critical_mean(&self, rubric: &Rubric) -> f64 {
        let names = rubric.critical_names();
        if names.is_empty() {
            return self.overall_score;
        }
        let sum: f64 = names
            .iter()
            .map(|name| {
                self.scores
                    .get(*name)
                    .map(|s| s.calibrated_score)
                    .unwrap_or(0.0)
            })
            .sum();
        sum / names.len() as f64
    }
}
