use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use gradeloop_oracle::{OracleError, OracleRequest, RetryPolicy, TextOracle};
use gradeloop_rubric::{normalize_content, Exemplar, Rubric};

use crate::{MutationRecord, MutationType};

#[derive(Error, Debug)]
pub enum MutateError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Oracle returned an empty mutation for exemplar {0}")]
    EmptyMutation(String),
}

/// Produces subtly degraded rewrites of good exemplars.
pub struct MutationGenerator {
    oracle: Arc<dyn TextOracle>,
    retry: RetryPolicy,
    rubric: Rubric,
    model: String,
}

const MUTATOR_SYSTEM_PROMPT: &str =
    "You are an educational content quality control expert. You produce degraded variants \
     of good content for testing graders. Respond with the rewritten content only.";

impl MutationGenerator {
    pub fn new(oracle: Arc<dyn TextOracle>, rubric: Rubric) -> Self {
        Self {
            oracle,
            retry: RetryPolicy::default(),
            rubric,
            model: "gpt-4".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Degrade one exemplar along a single rubric dimension.
    pub async fn mutate(
        &self,
        exemplar: &Exemplar,
        mutation_type: MutationType,
    ) -> Result<MutationRecord, MutateError> {
        let prompt = self.build_mutation_prompt(exemplar, mutation_type);
        // Mutations want variety, so generation runs warm.
        let request = OracleRequest::new(MUTATOR_SYSTEM_PROMPT, prompt)
            .with_model(&self.model)
            .with_temperature(0.7)
            .with_max_tokens(2000);

        debug!(
            exemplar = %exemplar.id,
            mutation = %mutation_type,
            "Generating mutation"
        );
        let completion = self.retry.complete(self.oracle.as_ref(), &request).await?;
        let mutated_text = normalize_content(&completion);
        if mutated_text.is_empty() {
            return Err(MutateError::EmptyMutation(exemplar.id.clone()));
        }

        let record =
            MutationRecord::new(&exemplar.id, mutation_type, mutated_text, &self.rubric);
        info!(
            exemplar = %exemplar.id,
            mutation = %mutation_type,
            record = %record.id,
            "Mutation generated"
        );
        Ok(record)
    }

    /// One mutation per type, for growing the negative corpus from a
    /// single good exemplar.
    pub async fn mutate_all(&self, exemplar: &Exemplar) -> Vec<Result<MutationRecord, MutateError>> {
        let mut records = Vec::with_capacity(MutationType::ALL.len());
        for mutation_type in MutationType::ALL {
            records.push(self.mutate(exemplar, mutation_type).await);
        }
        records
    }

    fn build_mutation_prompt(&self, exemplar: &Exemplar, mutation_type: MutationType) -> String {
        let degradations = mutation_type
            .degradations()
            .iter()
            .map(|d| format!("- {d}"))
            .collect::<Vec<_>>()
            .join("\n");
        let target = mutation_type.target_criterion();

        format!(
            r#"I will show you a GOOD example of high quality Grade {grade} {subject} content.
Create a BAD version that is deficient ONLY in the "{target}" dimension, using one or more of:
{degradations}

Keep every other quality dimension intact, and make the degradation subtle - it must not
be obvious that the content was tampered with.

GOOD EXAMPLE:
{content}

BAD EXAMPLE ({target} deficient):
"#,
            grade = exemplar.grade_level,
            subject = exemplar.subject,
            target = target,
            degradations = degradations,
            content = exemplar.text,
        )
    }
}
