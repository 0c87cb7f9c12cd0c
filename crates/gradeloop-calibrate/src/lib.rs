//! # gradeloop-calibrate
//!
//! Batch calibration of the rubric grader.
//!
//! The [`Calibrator`] grades a corpus of known-good exemplars with all
//! offsets zeroed, measures how harshly each criterion is scored on
//! average, and emits a [`CalibrationCurve`] of additive corrections.
//! [`CurveStore`] persists the curve; [`validate_mutations`] checks
//! that mutated exemplars fail where their labels say they should.

mod curve_store;
mod engine;
mod validate;

pub use curve_store::{CurveStore, CurveStoreError};
pub use engine::{CalibrationError, Calibrator};
pub use validate::{validate_mutations, MutationCheck, ValidationReport};

pub use gradeloop_rubric::CalibrationCurve;
