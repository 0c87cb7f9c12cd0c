use thiserror::Error;

use gradeloop_oracle::OracleError;

#[derive(Error, Debug)]
pub enum LoopError {
    /// Drafting itself failed after retries; nothing to grade.
    #[error("Draft generation failed: {0}")]
    Generation(#[from] OracleError),

    #[error("Oracle returned an empty draft on attempt {0}")]
    EmptyDraft(usize),

    #[error("Generation was cancelled")]
    Cancelled,
}
