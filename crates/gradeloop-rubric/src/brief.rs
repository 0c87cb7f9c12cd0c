use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::{GradeResult, Rubric};

/// A criterion the draft failed, with the grader's justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailingCriterion {
    pub name: String,
    pub score: f64,
    pub feedback: String,
}

/// Ranked revision instructions derived from one [`GradeResult`].
///
/// Critical issues surface first; failing criteria follow, worst
/// score first, so the generator attacks the most deficient dimension
/// before marginal ones. An empty brief is not a success signal;
/// callers must check `GradeResult::passed` themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementBrief {
    pub failing_criteria: Vec<FailingCriterion>,
    pub critical_issues: Vec<String>,
}

impl ImprovementBrief {
    /// Pure extraction: no oracle calls, no side effects.
    pub fn extract(rubric: &Rubric, result: &GradeResult) -> Self {
        if result.passed {
            return Self::default();
        }

        let mut failing: Vec<FailingCriterion> = rubric
            .criteria()
            .iter()
            .filter_map(|criterion| {
                let score = result.score_for(&criterion.name)?;
                if score.passed {
                    return None;
                }
                Some(FailingCriterion {
                    name: criterion.name.clone(),
                    score: score.calibrated_score,
                    feedback: result
                        .feedback
                        .get(&criterion.name)
                        .cloned()
                        .unwrap_or_else(|| "No specific feedback provided.".to_string()),
                })
            })
            .collect();
        failing.sort_by(|a, b| a.score.total_cmp(&b.score));

        Self {
            failing_criteria: failing,
            critical_issues: result.critical_issues.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failing_criteria.is_empty() && self.critical_issues.is_empty()
    }

    /// Render the brief as revision instructions for the generator.
    pub fn render(&self) -> String {
        let mut out = String::from("AREAS TO IMPROVE:\n");

        if !self.critical_issues.is_empty() {
            out.push_str("\nCRITICAL ISSUES (fix these first):\n");
            for issue in &self.critical_issues {
                let _ = writeln!(out, "- {issue}");
            }
        }

        for failing in &self.failing_criteria {
            let _ = writeln!(
                out,
                "\n{} ({:.2}):\n- {}",
                title_case(&failing.name),
                failing.score,
                failing.feedback
            );
        }

        out
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
