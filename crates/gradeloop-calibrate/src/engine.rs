use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use gradeloop_rubric::{
    CalibrationCurve, Exemplar, ExemplarFilter, ExemplarStore, RubricEvaluator, StoreError,
};

/// Default minimum exemplar count before offsets are trusted.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Too few exemplars to compute trustworthy offsets. Callers keep
    /// the previous curve; this never kills a batch job.
    #[error("Too few exemplars for calibration: have {have}, need {need}")]
    TooFewExemplars { have: usize, need: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes calibration offsets from known-good exemplars.
pub struct Calibrator<'a> {
    evaluator: &'a RubricEvaluator,
    min_samples: usize,
}

impl<'a> Calibrator<'a> {
    pub fn new(evaluator: &'a RubricEvaluator) -> Self {
        Self {
            evaluator,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Compute a curve from a fixed exemplar set.
    ///
    /// Every exemplar is graded raw (offsets zeroed, temperature 0).
    /// For each criterion the offset is `max(0, pass_threshold - mean
    /// raw score)`: a grader that is harsh on content already known to
    /// be good gets corrected uniformly, without loosening the
    /// rubric's discrimination between good and bad.
    pub async fn calibrate(
        &self,
        exemplars: &[Exemplar],
    ) -> Result<CalibrationCurve, CalibrationError> {
        if exemplars.len() < self.min_samples {
            warn!(
                have = exemplars.len(),
                need = self.min_samples,
                "Skipping calibration: sample too small"
            );
            return Err(CalibrationError::TooFewExemplars {
                have: exemplars.len(),
                need: self.min_samples,
            });
        }

        let rubric = self.evaluator.rubric();
        let mut sums: BTreeMap<String, f64> = rubric
            .criteria()
            .iter()
            .map(|c| (c.name.clone(), 0.0))
            .collect();

        for exemplar in exemplars {
            let result = self
                .evaluator
                .evaluate_raw(&exemplar.text, &exemplar.content_metadata())
                .await;
            for (name, sum) in sums.iter_mut() {
                let raw = result.score_for(name).map(|s| s.raw_score).unwrap_or(0.0);
                *sum += raw;
            }
            debug!(exemplar = %exemplar.id, overall = result.overall_score, "Exemplar graded raw");
        }

        let pass_threshold = rubric.global_pass_threshold();
        let count = exemplars.len() as f64;
        let offsets: BTreeMap<String, f64> = sums
            .into_iter()
            .map(|(name, sum)| {
                let mean = sum / count;
                let offset = (pass_threshold - mean).max(0.0);
                info!(criterion = %name, mean, offset, "Calibration offset computed");
                (name, offset)
            })
            .collect();

        Ok(CalibrationCurve::new(
            offsets,
            exemplars.len(),
            pass_threshold,
        ))
    }

    /// Fetch good exemplars from the corpus and calibrate from them.
    pub async fn calibrate_from_store(
        &self,
        store: &dyn ExemplarStore,
    ) -> Result<CalibrationCurve, CalibrationError> {
        let exemplars = store.fetch_exemplars(&ExemplarFilter::good()).await?;
        self.calibrate(&exemplars).await
    }
}
