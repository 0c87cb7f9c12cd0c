use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use gradeloop_rubric::Rubric;

/// Score injected into the expected map for the targeted criterion.
pub const KNOWN_BAD_SCORE: f64 = 0.0;
/// Score injected for every non-targeted criterion.
pub const KNOWN_GOOD_SCORE: f64 = 1.0;

/// The fixed set of mutation types, one per canonical rubric criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    Categorization,
    InstructionalStyle,
    WorkedExamples,
    ContentAccuracy,
    LanguageAppropriateness,
    Clarity,
    Formatting,
    ContentConsistency,
}

impl MutationType {
    pub const ALL: [MutationType; 8] = [
        MutationType::Categorization,
        MutationType::InstructionalStyle,
        MutationType::WorkedExamples,
        MutationType::ContentAccuracy,
        MutationType::LanguageAppropriateness,
        MutationType::Clarity,
        MutationType::Formatting,
        MutationType::ContentConsistency,
    ];

    /// The rubric criterion this mutation is expected to fail.
    pub fn target_criterion(&self) -> &'static str {
        match self {
            MutationType::Categorization => "categorization",
            MutationType::InstructionalStyle => "instructional_style",
            MutationType::WorkedExamples => "worked_examples",
            MutationType::ContentAccuracy => "content_accuracy",
            MutationType::LanguageAppropriateness => "language_appropriateness",
            MutationType::Clarity => "clarity",
            MutationType::Formatting => "formatting",
            MutationType::ContentConsistency => "content_consistency",
        }
    }

    /// Degradation instructions given to the oracle. Subtlety is the
    /// point: an obviously broken rewrite would not stress the rubric.
    pub fn degradations(&self) -> &'static [&'static str] {
        match self {
            MutationType::Categorization => &[
                "Drift the content away from the stated lesson objectives",
                "Pitch parts of the text at the wrong grade level",
            ],
            MutationType::InstructionalStyle => &[
                "Replace explicit teaching with open-ended inquiry questions",
                "Explain a key concept vaguely instead of step by step",
                "Drop the scaffolding between simple and complex ideas",
            ],
            MutationType::WorkedExamples => &[
                "Merge several solution steps into one leap",
                "Remove the example for one difficulty level",
                "Make an example more complex than the grade level allows",
            ],
            MutationType::ContentAccuracy => &[
                "Introduce one subtle factual error",
                "Slightly misstate a definition",
                "Swap two steps of a procedure so it no longer works",
            ],
            MutationType::LanguageAppropriateness => &[
                "Use vocabulary a few grades too advanced",
                "Lengthen sentences with nested clauses",
                "Leave a technical term undefined",
            ],
            MutationType::Clarity => &[
                "Make a central explanation ambiguous",
                "Reorder paragraphs so the logic no longer flows",
            ],
            MutationType::Formatting => &[
                "Collapse sections into a wall of text",
                "Make heading levels inconsistent",
            ],
            MutationType::ContentConsistency => &[
                "Switch terminology partway through",
                "Contradict an earlier statement later in the text",
            ],
        }
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_mutation", self.target_criterion())
    }
}

/// A degraded rewrite of an exemplar plus its expected-score label.
///
/// The expected scores are a label for downstream rubric validation,
/// not a guarantee about how the evaluator will actually score the
/// mutated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    pub id: Uuid,
    pub original_id: String,
    pub mutation_type: MutationType,
    pub target_criterion: String,
    pub mutated_text: String,
    pub expected_scores: BTreeMap<String, f64>,
}

impl MutationRecord {
    pub fn new(
        original_id: impl Into<String>,
        mutation_type: MutationType,
        mutated_text: String,
        rubric: &Rubric,
    ) -> Self {
        let target = mutation_type.target_criterion();
        let expected_scores = rubric
            .criteria()
            .iter()
            .map(|criterion| {
                let expected = if criterion.name == target {
                    KNOWN_BAD_SCORE
                } else {
                    KNOWN_GOOD_SCORE
                };
                (criterion.name.clone(), expected)
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            original_id: original_id.into(),
            mutation_type,
            target_criterion: target.to_string(),
            mutated_text,
            expected_scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mutation_maps_to_a_canonical_criterion() {
        let rubric = Rubric::default_article();
        for mutation_type in MutationType::ALL {
            assert!(
                rubric.criterion(mutation_type.target_criterion()).is_some(),
                "{mutation_type} has no matching criterion"
            );
            assert!(!mutation_type.degradations().is_empty());
        }
    }

    #[test]
    fn record_labels_target_bad_and_rest_good() {
        let rubric = Rubric::default_article();
        let record = MutationRecord::new(
            "exemplar-1",
            MutationType::WorkedExamples,
            "degraded text".to_string(),
            &rubric,
        );
        assert_eq!(record.target_criterion, "worked_examples");
        assert_eq!(record.expected_scores["worked_examples"], KNOWN_BAD_SCORE);
        assert_eq!(record.expected_scores["clarity"], KNOWN_GOOD_SCORE);
        assert_eq!(record.expected_scores.len(), rubric.criteria().len());
    }
}
