use serde::{Deserialize, Serialize};

use gradeloop_rubric::{GradeResult, ImprovementBrief, Rubric};

/// Overall-score differences below this are a tie, broken by the mean
/// calibrated score of the critical criteria.
pub const TIE_BAND: f64 = 0.05;

/// One immutable generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDraft {
    pub text: String,
    /// 0-indexed attempt this draft was produced on.
    pub attempt_index: usize,
    /// The feedback this draft was conditioned on, if any.
    pub parent_feedback: Option<ImprovementBrief>,
}

/// A graded draft held while the loop looks for a passing one.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub draft: ContentDraft,
    pub grade: GradeResult,
}

impl Candidate {
    /// Whether this candidate should be surfaced over `other`.
    ///
    /// Passing beats failing. Otherwise the higher overall score wins,
    /// unless the scores sit within [`TIE_BAND`] of each other, in
    /// which case the mean calibrated score over the critical criteria
    /// decides.
    pub fn is_better_than(&self, other: &Candidate, rubric: &Rubric) -> bool {
        if self.grade.passed != other.grade.passed {
            return self.grade.passed;
        }

        let diff = self.grade.overall_score - other.grade.overall_score;
        if diff.abs() < TIE_BAND {
            self.grade.critical_mean(rubric) > other.grade.critical_mean(rubric)
        } else {
            diff > 0.0
        }
    }
}
