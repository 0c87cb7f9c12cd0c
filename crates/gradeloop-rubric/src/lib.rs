//! # gradeloop-rubric
//!
//! Rubric-based grading for generated educational content.
//!
//! A [`Rubric`] is a fixed set of weighted, possibly-critical criteria.
//! The [`RubricEvaluator`] asks the text oracle to score each criterion
//! against a strict JSON schema, applies the [`CalibrationCurve`], and
//! folds the per-criterion scores into a [`GradeResult`] under a
//! conjunctive pass rule: the weighted average, every per-criterion
//! threshold, and an empty critical-issue list must all hold.
//! [`ImprovementBrief`] turns a failing result into ranked revision
//! instructions for the next draft.

mod brief;
mod config;
mod corpus;
mod criterion;
mod curve;
mod evaluator;
mod preprocess;
mod prompts;
mod result;

pub use brief::{FailingCriterion, ImprovementBrief};
pub use config::RubricFile;
pub use corpus::{
    Exemplar, ExemplarFilter, ExemplarStore, InMemoryExemplarStore, QualityStatus, StoreError,
};
pub use criterion::{Rubric, RubricCriterion, RubricError};
pub use curve::CalibrationCurve;
pub use evaluator::{ContentMetadata, CriterionJudgment, EvaluationError, RubricEvaluator};
pub use preprocess::normalize_content;
pub use prompts::EvaluationPrompts;
pub use result::{CriterionScore, GradeResult};
