use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Direction of a metric over time, judged from the vendor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClassification {
    Improving,
    Stable,
    Declining,
}

impl TrendClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendClassification::Improving => "improving",
            TrendClassification::Stable => "stable",
            TrendClassification::Declining => "declining",
        }
    }
}

/// Whether a rising value is good or bad news for the metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Risk score assigned to each trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrendScores {
    pub improving: f64,
    pub stable: f64,
    pub declining: f64,
}

impl TrendScores {
    pub fn for_classification(&self, classification: TrendClassification) -> f64 {
        match classification {
            TrendClassification::Improving => self.improving,
            TrendClassification::Stable => self.stable,
            TrendClassification::Declining => self.declining,
        }
    }
}

/// Per-metric trend parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrendProfile {
    pub polarity: Polarity,
    /// |relative change| above this is a meaningful move for the metric
    pub magnitude_threshold: f64,
    /// |relative change| above this alone makes a short series significant
    pub short_series_threshold: f64,
    pub scores: TrendScores,
}

impl TrendProfile {
    pub fn neutral_score(&self) -> f64 {
        self.scores.stable
    }
}

/// Significance settings shared by every metric.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendSettings {
    pub p_value_threshold: f64,
    pub correlation_threshold: f64,
    /// Series with at most this many points also use the short-series rule
    pub short_series_max_points: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            p_value_threshold: 0.05,
            correlation_threshold: 0.5,
            short_series_max_points: 3,
        }
    }
}

/// Outcome of a trend analysis for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub metric: String,
    pub classification: TrendClassification,
    pub score: f64,
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub relative_change: f64,
    pub statistical_sig: bool,
    pub correlation_sig: bool,
    pub magnitude_sig: bool,
    pub significant: bool,
    pub data_points: usize,
    pub first_value: Option<f64>,
    pub last_value: Option<f64>,
    /// "up", "down" or "flat" in raw value terms
    pub direction: &'static str,
}

impl TrendResult {
    fn insufficient(metric: &str, profile: &TrendProfile, data_points: usize) -> Self {
        Self {
            metric: metric.to_string(),
            classification: TrendClassification::Stable,
            score: profile.neutral_score(),
            slope: 0.0,
            intercept: 0.0,
            r_value: 0.0,
            r_squared: 0.0,
            p_value: 1.0,
            relative_change: 0.0,
            statistical_sig: false,
            correlation_sig: false,
            magnitude_sig: false,
            significant: false,
            data_points,
            first_value: None,
            last_value: None,
            direction: "flat",
        }
    }
}

/// Linear-trend classifier for yearly metric series.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer {
    settings: TrendSettings,
}

impl TrendAnalyzer {
    pub fn new(settings: TrendSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TrendSettings {
        &self.settings
    }

    /// Classify the trend of `values` over `years`.
    ///
    /// Pairs whose value is not finite are dropped and the rest sorted by year.
    /// Fewer than two usable points yields `Stable` with the neutral score.
    pub fn analyze(
        &self,
        metric: &str,
        years: &[i32],
        values: &[f64],
        profile: &TrendProfile,
    ) -> TrendResult {
        let mut points: Vec<(f64, f64)> = years
            .iter()
            .zip(values)
            .filter(|(_, value)| value.is_finite())
            .map(|(&year, &value)| (year as f64, value))
            .collect();

        if points.len() < 2 {
            return TrendResult::insufficient(metric, profile, points.len());
        }

        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let fit = linear_regression(&points);
        let first = points[0].1;
        let last = points[points.len() - 1].1;
        let relative_change = relative_change(first, last);

        let statistical_sig = fit.p_value < self.settings.p_value_threshold;
        let correlation_sig = fit.r_value.abs() > self.settings.correlation_threshold;
        let magnitude_sig = relative_change.abs() > profile.magnitude_threshold;

        let mut significant = statistical_sig || (correlation_sig && magnitude_sig);
        if points.len() <= self.settings.short_series_max_points {
            significant = significant || relative_change.abs() > profile.short_series_threshold;
        }

        let classification = classify(significant, fit.slope, profile.polarity);
        let score = profile.scores.for_classification(classification);

        tracing::debug!(
            metric,
            points = points.len(),
            slope = fit.slope,
            p_value = fit.p_value,
            relative_change,
            classification = classification.as_str(),
            "trend analyzed"
        );

        TrendResult {
            metric: metric.to_string(),
            classification,
            score,
            slope: fit.slope,
            intercept: fit.intercept,
            r_value: fit.r_value,
            r_squared: fit.r_value * fit.r_value,
            p_value: fit.p_value,
            relative_change,
            statistical_sig,
            correlation_sig,
            magnitude_sig,
            significant,
            data_points: points.len(),
            first_value: Some(first),
            last_value: Some(last),
            direction: if fit.slope > 0.0 {
                "up"
            } else if fit.slope < 0.0 {
                "down"
            } else {
                "flat"
            },
        }
    }
}

fn classify(significant: bool, slope: f64, polarity: Polarity) -> TrendClassification {
    if !significant || slope == 0.0 {
        return TrendClassification::Stable;
    }
    let rising = slope > 0.0;
    match (polarity, rising) {
        (Polarity::HigherIsBetter, true) | (Polarity::LowerIsBetter, false) => {
            TrendClassification::Improving
        }
        _ => TrendClassification::Declining,
    }
}

/// (last - first) / |first|, or the sign of `last` when `first` is zero.
pub fn relative_change(first: f64, last: f64) -> f64 {
    if first != 0.0 {
        (last - first) / first.abs()
    } else if last == 0.0 {
        0.0
    } else if last > 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub p_value: f64,
}

/// Ordinary least squares over `(x, y)` with a two-sided p-value for the slope.
pub fn linear_regression(points: &[(f64, f64)]) -> LinearFit {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
            r_value: 0.0,
            p_value: 1.0,
        };
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_value = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };

    let p_value = if points.len() == 2 {
        // Two points always fit exactly; any change is treated as significant
        if syy == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        let df = n - 2.0;
        let denom = (1.0 - r_value) * (1.0 + r_value);
        if denom <= 0.0 {
            0.0
        } else {
            let t = r_value * (df / denom).sqrt();
            student_t_two_sided(t, df)
        }
    };

    LinearFit {
        slope,
        intercept,
        r_value,
        p_value,
    }
}

/// P(|T| >= |t|) for Student's t with `df` degrees of freedom.
fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}
