use serde::{Deserialize, Serialize};

/// A closed scoring band: `low <= value <= high` scores `score`.
///
/// Omitting `low` or `high` in YAML leaves that side unbounded:
/// ```yaml
/// - { high: 1.81, score: 10 }
/// - { low: 1.81, high: 2.99, score: 5 }
/// - { low: 2.99, score: 1 }
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdBand {
    #[serde(default = "unbounded_low", skip_serializing_if = "is_unbounded")]
    pub low: f64,

    #[serde(default = "unbounded_high", skip_serializing_if = "is_unbounded")]
    pub high: f64,

    pub score: f64,
}

fn unbounded_low() -> f64 {
    f64::NEG_INFINITY
}

fn unbounded_high() -> f64 {
    f64::INFINITY
}

fn is_unbounded(bound: &f64) -> bool {
    bound.is_infinite()
}

impl ThresholdBand {
    pub const fn new(low: f64, high: f64, score: f64) -> Self {
        Self { low, high, score }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Ordered list of bands for one metric. First matching band wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ThresholdTable {
    bands: Vec<ThresholdBand>,
}

impl ThresholdTable {
    pub fn new(bands: Vec<ThresholdBand>) -> Self {
        Self { bands }
    }

    /// Build a table from `(low, high, score)` triples.
    pub fn from_triples(triples: &[(f64, f64, f64)]) -> Self {
        Self {
            bands: triples
                .iter()
                .map(|&(low, high, score)| ThresholdBand::new(low, high, score))
                .collect(),
        }
    }

    pub fn bands(&self) -> &[ThresholdBand] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Score `value` against this table, 0 when no band matches.
    pub fn score(&self, value: f64) -> f64 {
        score_with_thresholds(value, &self.bands)
    }

    pub fn matching_band(&self, value: f64) -> Option<&ThresholdBand> {
        self.bands.iter().find(|band| band.contains(value))
    }

    /// Push a message into `errors` for every authoring problem in this table.
    ///
    /// Bands must have `low <= high` and be listed in ascending order. Adjacent
    /// bands may share an endpoint (the earlier band owns it) but must not overlap.
    pub fn validate(&self, path: &str, errors: &mut Vec<String>) {
        if self.bands.is_empty() {
            errors.push(format!("{}: must contain at least one band", path));
            return;
        }

        for (i, band) in self.bands.iter().enumerate() {
            if band.low.is_nan() || band.high.is_nan() || !band.score.is_finite() {
                errors.push(format!("{}[{}]: bounds and score must be numbers", path, i));
                continue;
            }
            if band.low > band.high {
                errors.push(format!(
                    "{}[{}]: low {} is greater than high {}",
                    path, i, band.low, band.high
                ));
            }
        }

        for (i, pair) in self.bands.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.low < prev.high {
                errors.push(format!(
                    "{}[{}]: band starting at {} overlaps or precedes band ending at {}",
                    path,
                    i + 1,
                    next.low,
                    prev.high
                ));
            }
        }
    }
}

impl From<Vec<ThresholdBand>> for ThresholdTable {
    fn from(bands: Vec<ThresholdBand>) -> Self {
        Self::new(bands)
    }
}

/// Return the score of the first band containing `value`, else 0.
///
/// A 0 result means "unscored" and is not an error. NaN never matches.
pub fn score_with_thresholds(value: f64, bands: &[ThresholdBand]) -> f64 {
    bands
        .iter()
        .find(|band| band.contains(value))
        .map(|band| band.score)
        .unwrap_or(0.0)
}
