//! Rubric configuration file support.
//!
//! Loads a rubric from `rubric.toml` so deployments can swap the
//! canonical criteria set without code changes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::{Rubric, RubricCriterion};

/// The rubric config file name.
pub const RUBRIC_FILE_NAME: &str = "rubric.toml";

/// On-disk rubric shape.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RubricFile {
    pub global_pass_threshold: f64,
    pub criteria: Vec<RubricCriterion>,
}

impl RubricFile {
    /// Load a rubric from a directory.
    ///
    /// Returns:
    /// - `Ok(Some(rubric))` if the file exists and validates
    /// - `Ok(None)` if the file does not exist (caller falls back to
    ///   the canonical rubric)
    /// - `Err(...)` if the file exists but fails to parse or validate
    pub fn load(dir: &Path) -> Result<Option<Rubric>> {
        let path = dir.join(RUBRIC_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let file: RubricFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let rubric = Rubric::new(file.criteria, file.global_pass_threshold)
            .with_context(|| format!("Invalid rubric in {}", path.display()))?;

        Ok(Some(rubric))
    }
}
