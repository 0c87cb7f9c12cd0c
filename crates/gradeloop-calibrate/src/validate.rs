use serde::Serialize;
use tracing::info;

use gradeloop_mutate::MutationRecord;
use gradeloop_rubric::{ContentMetadata, RubricEvaluator};

/// Tolerance when comparing a raw score against its expected label.
/// Labels are coarse (known-bad 0.0 / known-good 1.0); the grader only
/// has to land on the right side of the criterion threshold.
const LABEL_TOLERANCE: f64 = 0.25;

/// Outcome of replaying one mutation record through the raw grader.
#[derive(Debug, Clone, Serialize)]
pub struct MutationCheck {
    pub record_id: String,
    pub target_criterion: String,
    /// The targeted criterion scored low, as labeled.
    pub target_detected: bool,
    /// Non-targeted criteria that also scored far below their label.
    pub collateral: Vec<String>,
}

impl MutationCheck {
    /// The mutation behaved exactly as labeled: only the target failed.
    pub fn is_clean(&self) -> bool {
        self.target_detected && self.collateral.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<MutationCheck>,
}

impl ValidationReport {
    /// Fraction of mutations where the rubric isolated the targeted
    /// criterion. Low values mean the rubric does not discriminate.
    pub fn discrimination_rate(&self) -> f64 {
        if self.checks.is_empty() {
            return 0.0;
        }
        let clean = self.checks.iter().filter(|c| c.is_clean()).count();
        clean as f64 / self.checks.len() as f64
    }
}

/// Grade mutated exemplars raw and compare against their labels.
///
/// This is the verification half of the mutation pipeline: the
/// generator only promises intent, the grader's actual output decides
/// whether the rubric caught the degradation.
pub async fn validate_mutations(
    evaluator: &RubricEvaluator,
    metadata: &ContentMetadata,
    records: &[MutationRecord],
) -> ValidationReport {
    let mut checks = Vec::with_capacity(records.len());

    for record in records {
        let result = evaluator.evaluate_raw(&record.mutated_text, metadata).await;

        let mut target_detected = false;
        let mut collateral = Vec::new();
        for (criterion, expected) in &record.expected_scores {
            let raw = result
                .score_for(criterion)
                .map(|s| s.raw_score)
                .unwrap_or(0.0);
            let on_label = (raw - expected).abs() <= LABEL_TOLERANCE;
            if criterion == &record.target_criterion {
                target_detected = on_label;
            } else if !on_label {
                collateral.push(criterion.clone());
            }
        }

        info!(
            record = %record.id,
            target = %record.target_criterion,
            target_detected,
            collateral = collateral.len(),
            "Mutation validated"
        );
        checks.push(MutationCheck {
            record_id: record.id.to_string(),
            target_criterion: record.target_criterion.clone(),
            target_detected,
            collateral,
        });
    }

    ValidationReport { checks }
}
