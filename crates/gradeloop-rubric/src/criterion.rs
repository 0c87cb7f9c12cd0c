use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a rubric configuration.
#[derive(Error, Debug)]
pub enum RubricError {
    #[error("Rubric has no criteria")]
    Empty,

    #[error("Duplicate criterion name: {0}")]
    DuplicateName(String),

    #[error("Criterion '{name}': weight must be non-negative, got {weight}")]
    NegativeWeight { name: String, weight: f64 },

    #[error("Criterion '{name}': {field} must be within [0, 1], got {value}")]
    ThresholdOutOfRange {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error(
        "Criterion '{name}': critical threshold {critical} is below pass threshold {pass}"
    )]
    CriticalBelowPass {
        name: String,
        critical: f64,
        pass: f64,
    },

    #[error("Global pass threshold must be within [0, 1], got {0}")]
    GlobalThresholdOutOfRange(f64),
}

/// A single weighted scoring criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    pub description: String,
    /// Relative weight in the overall score. A zero-weight criterion
    /// still participates in the pass/fail gate.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Critical criteria gate against `critical_threshold` and their
    /// failure fails the whole evaluation regardless of the average.
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
    /// Aspects the grader is told to evaluate.
    #[serde(default)]
    pub components: Vec<String>,
    /// Failure modes the grader is told to flag as issues.
    #[serde(default)]
    pub failure_modes: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_pass_threshold() -> f64 {
    0.75
}

fn default_critical_threshold() -> f64 {
    0.90
}

impl RubricCriterion {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weight: default_weight(),
            is_critical: false,
            pass_threshold: default_pass_threshold(),
            critical_threshold: default_critical_threshold(),
            components: Vec::new(),
            failure_modes: Vec::new(),
        }
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_components(mut self, components: &[&str]) -> Self {
        self.components = components.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_failure_modes(mut self, failure_modes: &[&str]) -> Self {
        self.failure_modes = failure_modes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The threshold this criterion's calibrated score must clear.
    pub fn effective_threshold(&self) -> f64 {
        if self.is_critical {
            self.critical_threshold
        } else {
            self.pass_threshold
        }
    }

    fn validate(&self) -> Result<(), RubricError> {
        if self.weight < 0.0 || !self.weight.is_finite() {
            return Err(RubricError::NegativeWeight {
                name: self.name.clone(),
                weight: self.weight,
            });
        }
        for (field, value) in [
            ("pass_threshold", self.pass_threshold),
            ("critical_threshold", self.critical_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RubricError::ThresholdOutOfRange {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        if self.is_critical && self.critical_threshold < self.pass_threshold {
            return Err(RubricError::CriticalBelowPass {
                name: self.name.clone(),
                critical: self.critical_threshold,
                pass: self.pass_threshold,
            });
        }
        Ok(())
    }
}

/// An immutable set of criteria plus the global pass bar.
///
/// Built once per evaluator instance and never mutated afterwards.
// Deserialization goes through `RubricFile` so validation always runs.
#[derive(Debug, Clone, Serialize)]
pub struct Rubric {
    criteria: Vec<RubricCriterion>,
    global_pass_threshold: f64,
}

impl Rubric {
    pub fn new(
        criteria: Vec<RubricCriterion>,
        global_pass_threshold: f64,
    ) -> Result<Self, RubricError> {
        if criteria.is_empty() {
            return Err(RubricError::Empty);
        }
        if !(0.0..=1.0).contains(&global_pass_threshold) {
            return Err(RubricError::GlobalThresholdOutOfRange(global_pass_threshold));
        }
        let mut seen = std::collections::HashSet::new();
        for criterion in &criteria {
            criterion.validate()?;
            if !seen.insert(criterion.name.clone()) {
                return Err(RubricError::DuplicateName(criterion.name.clone()));
            }
        }
        Ok(Self {
            criteria,
            global_pass_threshold,
        })
    }

    pub fn criteria(&self) -> &[RubricCriterion] {
        &self.criteria
    }

    pub fn global_pass_threshold(&self) -> f64 {
        self.global_pass_threshold
    }

    pub fn criterion(&self, name: &str) -> Option<&RubricCriterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    /// Names of the critical criteria, in rubric order.
    pub fn critical_names(&self) -> Vec<&str> {
        self.criteria
            .iter()
            .filter(|c| c.is_critical)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    /// The canonical article rubric.
    ///
    /// Eight criteria for Direct Instruction articles: three critical
    /// (instructional style, worked examples, content accuracy) at a
    /// 0.90 bar and weight 1.2, formatting slightly down-weighted, a
    /// 0.75 per-criterion floor and a 0.85 global pass bar.
    pub fn default_article() -> Self {
        let criteria = vec![
            RubricCriterion::new(
                "categorization",
                "Appropriate subject, grade, standard, and lesson categorization",
            )
            .with_components(&[
                "Subject accuracy",
                "Grade level accuracy",
                "Standard alignment",
                "Lesson specificity",
            ])
            .with_failure_modes(&[
                "Incorrect subject area",
                "Wrong grade level",
                "Not specific to lesson objectives",
            ]),
            RubricCriterion::new(
                "instructional_style",
                "Explicitly teaches in Direct Instruction style with clear procedures",
            )
            .critical()
            .with_weight(1.2)
            .with_components(&[
                "Direct instruction approach",
                "Clear conceptual explanations",
                "Procedural guidance",
                "Scaffolded learning structure",
            ])
            .with_failure_modes(&[
                "Uses inquiry-based approach instead of direct instruction",
                "Concepts explained vaguely or incompletely",
                "Missing step-by-step procedures",
            ]),
            RubricCriterion::new(
                "worked_examples",
                "Contains effective worked examples for all difficulty levels",
            )
            .critical()
            .with_weight(1.2)
            .with_components(&[
                "Step breakdown for lower working memory",
                "Examples for easy, medium, and hard concepts",
                "Examples appropriate for grade level",
            ])
            .with_failure_modes(&[
                "Steps not broken down adequately",
                "Missing examples for key concepts",
                "Examples too complex for grade level",
            ]),
            RubricCriterion::new(
                "content_accuracy",
                "Content is factually accurate and free of misconceptions",
            )
            .critical()
            .with_weight(1.2)
            .with_components(&[
                "Factual correctness",
                "Accurate definitions",
                "Correct procedures",
            ])
            .with_failure_modes(&[
                "Contains factual errors",
                "Presents misconceptions",
                "Erroneous procedures",
            ]),
            RubricCriterion::new(
                "language_appropriateness",
                "Grade-level vocabulary and sentence structure",
            )
            .with_components(&[
                "Age-appropriate vocabulary",
                "Appropriate sentence complexity",
                "Defined technical terms",
            ])
            .with_failure_modes(&[
                "Vocabulary too advanced for grade level",
                "Overly complex sentence structures",
                "Undefined technical terms",
            ]),
            RubricCriterion::new("clarity", "Clear, direct, and unambiguous explanations")
                .with_components(&[
                    "Clear explanations",
                    "Direct language",
                    "Logical flow",
                ])
                .with_failure_modes(&[
                    "Confusing explanations",
                    "Ambiguous terminology",
                    "Illogical organization",
                ]),
            RubricCriterion::new("formatting", "Properly formatted with visual organization")
                .with_weight(0.8)
                .with_components(&[
                    "Consistent headings",
                    "Appropriate paragraph breaks",
                    "Clean layout",
                ])
                .with_failure_modes(&[
                    "Wall of text without breaks",
                    "Inconsistent heading structure",
                ]),
            RubricCriterion::new(
                "content_consistency",
                "Uniform explanations across related lessons",
            )
            .with_components(&[
                "Consistent terminology with prerequisites",
                "Builds on previous concepts",
                "Reinforces key principles",
            ])
            .with_failure_modes(&[
                "Contradicts previous lesson content",
                "Inconsistent explanation methods",
            ]),
        ];

        Self::new(criteria, 0.85).expect("canonical rubric is valid")
    }
}
