use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-criterion additive calibration offsets.
///
/// Offsets compensate for systematic grader harshness measured against
/// known-good exemplars; they are never negative, so calibration can
/// only make passing easier, never harder. Evaluators hold the curve
/// as an immutable snapshot that is swapped whole on reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub offsets: BTreeMap<String, f64>,
    /// How many exemplars the curve was computed from.
    pub computed_from: usize,
    /// The pass threshold the curve was computed against. A curve
    /// computed for a different threshold is stale.
    pub pass_threshold: f64,
}

impl CalibrationCurve {
    /// The identity curve: no correction applied.
    pub fn empty() -> Self {
        Self {
            offsets: BTreeMap::new(),
            computed_from: 0,
            pass_threshold: 0.0,
        }
    }

    pub fn new(offsets: BTreeMap<String, f64>, computed_from: usize, pass_threshold: f64) -> Self {
        let offsets = offsets
            .into_iter()
            .map(|(name, offset)| (name, offset.max(0.0)))
            .collect();
        Self {
            offsets,
            computed_from,
            pass_threshold,
        }
    }

    /// Offset for a criterion; unknown criteria get no correction.
    pub fn offset_for(&self, criterion: &str) -> f64 {
        self.offsets.get(criterion).copied().unwrap_or(0.0)
    }

    /// Apply the offset, capping at a perfect score.
    pub fn apply(&self, criterion: &str, raw_score: f64) -> f64 {
        (raw_score + self.offset_for(criterion)).min(1.0)
    }

    /// Whether this curve was computed against a different pass
    /// threshold than the one now in force.
    pub fn is_stale_for(&self, pass_threshold: f64) -> bool {
        self.computed_from > 0 && (self.pass_threshold - pass_threshold).abs() > 1e-9
    }
}

impl Default for CalibrationCurve {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_clamped_non_negative() {
        let mut offsets = BTreeMap::new();
        offsets.insert("clarity".to_string(), -0.2);
        offsets.insert("accuracy".to_string(), 0.1);
        let curve = CalibrationCurve::new(offsets, 5, 0.85);
        assert_eq!(curve.offset_for("clarity"), 0.0);
        assert_eq!(curve.offset_for("accuracy"), 0.1);
    }

    #[test]
    fn apply_caps_at_one() {
        let mut offsets = BTreeMap::new();
        offsets.insert("clarity".to_string(), 0.3);
        let curve = CalibrationCurve::new(offsets, 5, 0.85);
        assert_eq!(curve.apply("clarity", 0.9), 1.0);
        assert!((curve.apply("clarity", 0.5) - 0.8).abs() < 1e-9);
        // Calibrated score is never below the raw score.
        assert_eq!(curve.apply("unknown", 0.42), 0.42);
    }

    #[test]
    fn staleness_tracks_threshold_mismatch() {
        let curve = CalibrationCurve::new(BTreeMap::new(), 20, 0.85);
        assert!(!curve.is_stale_for(0.85));
        assert!(curve.is_stale_for(0.90));
        // The empty curve is never stale.
        assert!(!CalibrationCurve::empty().is_stale_for(0.90));
    }
}
