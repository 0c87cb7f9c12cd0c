use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use gradeloop_rubric::CalibrationCurve;

#[derive(Error, Debug)]
pub enum CurveStoreError {
    #[error("Failed to read curve file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write curve file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Curve file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// File-backed persistence for the calibration curve.
///
/// The on-disk format is a flat JSON object: the offsets map plus the
/// sample size and pass threshold the curve was computed against.
pub struct CurveStore {
    path: PathBuf,
}

impl CurveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted curve, or the empty curve if none exists yet.
    pub fn load(&self) -> Result<CalibrationCurve, CurveStoreError> {
        if !self.path.exists() {
            return Ok(CalibrationCurve::empty());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            CurveStoreError::Read {
                path: self.path.clone(),
                source,
            }
        })?;
        serde_json::from_str(&content).map_err(|source| CurveStoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, curve: &CalibrationCurve) -> Result<(), CurveStoreError> {
        let json = serde_json::to_string_pretty(curve).expect("curve serializes");
        std::fs::write(&self.path, json).map_err(|source| CurveStoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(
            path = %self.path.display(),
            criteria = curve.offsets.len(),
            computed_from = curve.computed_from,
            "Calibration curve saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_loads_as_empty_curve() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curve.json"));
        assert_eq!(store.load().unwrap(), CalibrationCurve::empty());
    }

    #[test]
    fn round_trips_offsets_and_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let store = CurveStore::new(dir.path().join("curve.json"));

        let mut offsets = BTreeMap::new();
        offsets.insert("completeness".to_string(), 0.1);
        offsets.insert("clarity".to_string(), 0.0);
        let curve = CalibrationCurve::new(offsets, 37, 0.85);

        store.save(&curve).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, curve);
        assert!(loaded.is_stale_for(0.9));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        std::fs::write(&path, "not json").unwrap();
        let store = CurveStore::new(path);
        assert!(matches!(store.load(), Err(CurveStoreError::Parse { .. })));
    }
}
