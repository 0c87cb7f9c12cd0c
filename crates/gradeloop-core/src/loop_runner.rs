use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use gradeloop_logging::{LogEvent, Logger};
use gradeloop_oracle::{OracleRequest, RetryPolicy, TextOracle};
use gradeloop_rubric::{normalize_content, ImprovementBrief, RubricEvaluator};

use crate::draft::{Candidate, ContentDraft};
use crate::error::LoopError;
use crate::prompts::DraftPrompts;
use crate::report::GenerationReport;
use crate::spec::GenerationSpec;

/// Orchestrates the draft/grade/improve loop for one request.
pub struct GenerationLoop<'a> {
    oracle: Arc<dyn TextOracle>,
    evaluator: &'a RubricEvaluator,
    retry: RetryPolicy,
    model: String,
    logger: Arc<Logger>,
    cancelled: Arc<AtomicBool>,
}

impl<'a> GenerationLoop<'a> {
    pub fn new(
        oracle: Arc<dyn TextOracle>,
        evaluator: &'a RubricEvaluator,
        logger: Arc<Logger>,
    ) -> Self {
        // One flag covers both the loop and the evaluator, so a single
        // cancel stops drafting and any in-progress grading.
        let cancelled = evaluator.interrupt_handle();
        Self {
            oracle,
            evaluator,
            retry: RetryPolicy::default(),
            model: "gpt-4".to_string(),
            logger,
            cancelled,
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

    /// Get a handle to signal cancellation
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Run the loop: up to `max_retries + 1` draft/grade cycles.
    ///
    /// Returns immediately on the first passing draft. When the budget
    /// runs out, the best failing candidate is surfaced with
    /// `passed: false` rather than an error. Only a drafting failure on
    /// the final attempt is a hard failure.
    pub async fn run(
        &self,
        spec: &GenerationSpec,
        max_retries: usize,
    ) -> Result<GenerationReport, LoopError> {
        self.logger.log(&LogEvent::LoopStarted {
            topic: spec.topic.clone(),
            grade_level: spec.grade_level,
            subject: spec.subject.clone(),
            max_retries,
        });

        let metadata = spec.metadata();
        let rubric = self.evaluator.rubric();
        let mut best: Option<Candidate> = None;
        let mut feedback: Option<(String, ImprovementBrief)> = None;
        let mut attempts_used = 0;

        for attempt in 0..=max_retries {
            if self.cancelled.load(Ordering::SeqCst) {
                info!(attempt, "Generation loop cancelled");
                return Err(LoopError::Cancelled);
            }

            self.logger.log(&LogEvent::DraftStarted {
                attempt,
                has_feedback: feedback.is_some(),
            });

            let draft = match self.draft(spec, attempt, feedback.as_ref()).await {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(attempt, error = %e, "Drafting failed");
                    self.logger.log(&LogEvent::ErrorEncountered {
                        attempt,
                        error: e.to_string(),
                    });
                    if attempt == max_retries {
                        return Err(e);
                    }
                    // Consume the attempt; the previous feedback still
                    // applies to the next try.
                    continue;
                }
            };

            self.logger.log(&LogEvent::DraftCompleted {
                attempt,
                content_len: draft.text.len(),
            });

            debug!(attempt, "Grading draft");
            let grade = self.evaluator.evaluate(&draft.text, &metadata).await;
            attempts_used = attempt + 1;

            self.logger.log(&LogEvent::GradeCompleted {
                attempt,
                overall_score: grade.overall_score,
                passed: grade.passed,
                critical_issues: grade.critical_issues.len(),
            });

            if grade.passed {
                self.logger.log(&LogEvent::LoopCompleted {
                    attempts: attempts_used,
                    overall_score: grade.overall_score,
                    passed: true,
                });
                return Ok(GenerationReport::from_candidate(
                    Candidate { draft, grade },
                    attempts_used,
                ));
            }

            let brief = ImprovementBrief::extract(rubric, &grade);
            if attempt < max_retries {
                self.logger.log(&LogEvent::ImprovementExtracted {
                    attempt,
                    failing_criteria: brief.failing_criteria.len(),
                    critical_issues: brief.critical_issues.len(),
                });
                feedback = Some((draft.text.clone(), brief));
            }

            let candidate = Candidate { draft, grade };
            let replace = best
                .as_ref()
                .map_or(true, |current| candidate.is_better_than(current, rubric));
            if replace {
                best = Some(candidate);
            }
        }

        match best {
            Some(best) => {
                self.logger.log(&LogEvent::RetriesExhausted {
                    attempts: attempts_used,
                    best_score: best.grade.overall_score,
                });
                self.logger.log(&LogEvent::LoopCompleted {
                    attempts: attempts_used,
                    overall_score: best.grade.overall_score,
                    passed: false,
                });
                info!(
                    attempts = attempts_used,
                    score = best.grade.overall_score,
                    "Returning best failing candidate"
                );
                Ok(GenerationReport::from_candidate(best, attempts_used))
            }
            // The final-attempt drafting error path returns above, so a
            // run that finishes the loop always graded something.
            None => Err(LoopError::EmptyDraft(max_retries)),
        }
    }

    async fn draft(
        &self,
        spec: &GenerationSpec,
        attempt: usize,
        feedback: Option<&(String, ImprovementBrief)>,
    ) -> Result<ContentDraft, LoopError> {
        let (prompt, parent_feedback) = match feedback {
            Some((previous, brief)) => (
                DraftPrompts::revision_prompt(spec, previous, brief),
                Some(brief.clone()),
            ),
            None => (DraftPrompts::initial_prompt(spec, attempt), None),
        };

        // Drafting runs warm; determinism only matters for grading.
        let request = OracleRequest::new(DraftPrompts::system_prompt(spec), prompt)
            .with_model(&self.model)
            .with_temperature(0.7)
            .with_max_tokens(2500);

        let completion = self.retry.complete(self.oracle.as_ref(), &request).await?;
        let text = normalize_content(&completion);
        if text.is_empty() {
            return Err(LoopError::EmptyDraft(attempt));
        }

        Ok(ContentDraft {
            text,
            attempt_index: attempt,
            parent_feedback,
        })
    }
}
