use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

use gradeloop_calibrate::{CurveStore, CurveStoreError};
use gradeloop_logging::{LogEvent, LogFormat, Logger};
use gradeloop_oracle::TextOracle;
use gradeloop_rubric::{normalize_content, ContentMetadata, GradeResult, Rubric, RubricEvaluator};

use crate::error::LoopError;
use crate::loop_runner::GenerationLoop;
use crate::report::GenerationReport;
use crate::spec::GenerationSpec;

/// Process-level facade over generation and grading.
///
/// Constructed once with its rubric and calibration curve injected;
/// independent instances carry independent configuration, so tests can
/// run distinct rubrics side by side. Concurrent calls share only the
/// read-mostly curve snapshot inside the evaluator.
pub struct QualityService {
    oracle: Arc<dyn TextOracle>,
    evaluator: RubricEvaluator,
    curve_store: Option<CurveStore>,
    logger: Arc<Logger>,
    model: String,
    max_retries: usize,
}

impl QualityService {
    pub fn new(oracle: Arc<dyn TextOracle>, rubric: Rubric) -> Self {
        let evaluator = RubricEvaluator::new(oracle.clone(), rubric);
        Self {
            oracle,
            evaluator,
            curve_store: None,
            logger: Arc::new(Logger::new(LogFormat::Pretty)),
            model: "gpt-4".to_string(),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.evaluator = self.evaluator.with_model(model.clone());
        self.model = model;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Attach a persisted curve: loads it now, enables [`Self::reload_curve`].
    pub fn with_curve_store(mut self, store: CurveStore) -> Result<Self, CurveStoreError> {
        let curve = store.load()?;
        info!(
            path = %store.path().display(),
            criteria = curve.offsets.len(),
            "Loaded calibration curve"
        );
        self.evaluator.set_curve(curve);
        self.curve_store = Some(store);
        Ok(self)
    }

    pub fn evaluator(&self) -> &RubricEvaluator {
        &self.evaluator
    }

    pub fn rubric(&self) -> &Rubric {
        self.evaluator.rubric()
    }

    /// Handle that cancels in-flight generation and grading.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.evaluator.interrupt_handle()
    }

    /// Run the full quality-gated loop for one request.
    pub async fn generate(&self, spec: &GenerationSpec) -> Result<GenerationReport, LoopError> {
        let runner = GenerationLoop::new(self.oracle.clone(), &self.evaluator, self.logger.clone())
            .with_model(&self.model);
        runner.run(spec, self.max_retries).await
    }

    /// Grade caller-supplied content without generating anything.
    pub async fn grade(&self, content: &str, metadata: &ContentMetadata) -> GradeResult {
        self.evaluator
            .evaluate(&normalize_content(content), metadata)
            .await
    }

    /// Re-read the persisted curve and swap it in atomically.
    ///
    /// In-flight evaluations keep the snapshot they started with.
    pub fn reload_curve(&self) -> Result<(), CurveStoreError> {
        let Some(ref store) = self.curve_store else {
            debug!("No curve store configured, keeping current curve");
            return Ok(());
        };

        let curve = store.load()?;
        self.logger.log(&LogEvent::CurveReloaded {
            criteria: curve.offsets.len(),
            computed_from: curve.computed_from,
        });
        self.evaluator.set_curve(curve);
        Ok(())
    }
}
