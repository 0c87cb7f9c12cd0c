use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use gradeloop_rubric::CriterionScore;

use crate::draft::Candidate;

/// The caller-facing result of one generation request.
///
/// This shape is stable regardless of transport: an exhausted retry
/// budget still produces a report with `passed: false` and the
/// accumulated per-criterion feedback, never a hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub content: String,
    pub passed: bool,
    pub overall_score: f64,
    pub criterion_scores: BTreeMap<String, CriterionScore>,
    pub critical_issues: Vec<String>,
    /// Per-criterion grader justification for the returned draft.
    pub feedback: BTreeMap<String, String>,
    /// Draft/grade cycles spent, including the returned one.
    pub attempts_used: usize,
    pub generated_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn from_candidate(candidate: Candidate, attempts_used: usize) -> Self {
        Self {
            content: candidate.draft.text,
            passed: candidate.grade.passed,
            overall_score: candidate.grade.overall_score,
            criterion_scores: candidate.grade.scores,
            critical_issues: candidate.grade.critical_issues,
            feedback: candidate.grade.feedback,
            attempts_used,
            generated_at: Utc::now(),
        }
    }
}
