//! Exemplar corpus boundary.
//!
//! The corpus itself is owned elsewhere; calibration and mutation only
//! need to fetch labeled exemplars through this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ContentMetadata;

/// Content with an established human-trusted quality label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    pub id: String,
    pub text: String,
    pub grade_level: u8,
    pub subject: String,
    /// Rubric criterion this exemplar primarily exercises, if any.
    pub criterion: Option<String>,
    pub lesson: Option<String>,
    pub difficulty: Option<String>,
}

impl Exemplar {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            grade_level: 4,
            subject: "Language Arts".to_string(),
            criterion: None,
            lesson: None,
            difficulty: None,
        }
    }

    pub fn content_metadata(&self) -> ContentMetadata {
        ContentMetadata::new(self.grade_level, self.subject.clone())
    }
}

/// Quality label on a stored exemplar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Good,
    Bad,
}

/// Filter for fetching exemplars from the corpus.
#[derive(Debug, Clone, Default)]
pub struct ExemplarFilter {
    pub quality_status: Option<QualityStatus>,
    pub criterion: Option<String>,
    pub lesson: Option<String>,
    pub difficulty: Option<String>,
}

impl ExemplarFilter {
    pub fn good() -> Self {
        Self {
            quality_status: Some(QualityStatus::Good),
            ..Default::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Exemplar store backend error: {0}")]
    Backend(String),
}

/// Read access to the exemplar corpus.
#[async_trait]
pub trait ExemplarStore: Send + Sync {
    async fn fetch_exemplars(&self, filter: &ExemplarFilter) -> Result<Vec<Exemplar>, StoreError>;
}

/// In-memory store for tests and batch-job dry runs.
#[derive(Default)]
pub struct InMemoryExemplarStore {
    entries: Vec<(QualityStatus, Exemplar)>,
}

impl InMemoryExemplarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, status: QualityStatus, exemplar: Exemplar) {
        self.entries.push((status, exemplar));
    }
}

#[async_trait]
impl ExemplarStore for InMemoryExemplarStore {
    async fn fetch_exemplars(&self, filter: &ExemplarFilter) -> Result<Vec<Exemplar>, StoreError> {
        let matches = self
            .entries
            .iter()
            .filter(|(status, exemplar)| {
                filter.quality_status.map_or(true, |want| want == *status)
                    && filter
                        .criterion
                        .as_ref()
                        .map_or(true, |want| exemplar.criterion.as_ref() == Some(want))
                    && filter
                        .lesson
                        .as_ref()
                        .map_or(true, |want| exemplar.lesson.as_ref() == Some(want))
                    && filter
                        .difficulty
                        .as_ref()
                        .map_or(true, |want| exemplar.difficulty.as_ref() == Some(want))
            })
            .map(|(_, exemplar)| exemplar.clone())
            .collect();
        Ok(matches)
    }
}
