//! # gradeloop-core
//!
//! The quality-gated generation loop: draft, grade, improve, repeat.
//!
//! [`GenerationLoop`] drives one request through up to `max_retries + 1`
//! draft/grade cycles against a [`gradeloop_rubric::RubricEvaluator`],
//! accepting the first passing draft and otherwise surfacing the best
//! failing candidate. [`QualityService`] is the process-level facade
//! that owns the oracle, evaluator, and calibration curve reload.

mod draft;
mod error;
mod loop_runner;
mod prompts;
mod report;
mod service;
mod spec;

pub use draft::{Candidate, ContentDraft, TIE_BAND};
pub use error::LoopError;
pub use loop_runner::GenerationLoop;
pub use prompts::DraftPrompts;
pub use report::GenerationReport;
pub use service::QualityService;
pub use spec::{ContentKind, GenerationSpec};
