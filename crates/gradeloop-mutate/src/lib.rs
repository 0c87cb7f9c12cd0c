//! # gradeloop-mutate
//!
//! Synthesizes adversarial "bad" variants of known-good exemplars.
//!
//! Each [`MutationType`] targets exactly one rubric criterion: the
//! oracle rewrites the exemplar so that it should fail the targeted
//! criterion while staying plausible on the others. The resulting
//! [`MutationRecord`] carries an expected-score map used as a label
//! when the rubric's discrimination is validated downstream; this
//! crate only synthesizes, it never verifies.

mod generator;
mod mutation;

pub use generator::{MutateError, MutationGenerator};
pub use mutation::{MutationRecord, MutationType};
