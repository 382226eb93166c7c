//! Fatigue heuristic: slope of smoothed heart rate over elapsed time.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::smoothing::trailing_mean;
use crate::stats::{linear_fit, LinearFit};
use crate::types::{Column, DerivedSeries, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    /// Fixed threshold on the slope magnitude; not a significance test.
    pub fn classify(slope: f64, threshold: f64) -> Self {
        if slope > threshold {
            TrendDirection::Rising
        } else if slope < -threshold {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatigueTrend {
    pub direction: TrendDirection,
    /// bpm per second
    pub slope_bpm_per_s: f64,
    pub intercept_bpm: f64,
    pub r_squared: Option<f64>,
    pub threshold_bpm_per_s: f64,
    pub smoothing_window: usize,
    pub points: usize,
}

pub fn fatigue_trend(
    derived: &DerivedSeries,
    window: usize,
    threshold: f64,
) -> Result<FatigueTrend, AnalysisError> {
    derived.fields.require(Metric::HrTrend, &[Column::HeartRate])?;

    let hr: Vec<Option<f64>> = derived.samples.iter().map(|s| s.heart_rate).collect();
    let smoothed = trailing_mean(&hr, window);
    let points: Vec<(f64, f64)> = derived
        .samples
        .iter()
        .zip(smoothed)
        .filter_map(|(s, v)| v.map(|v| (s.elapsed_s, v)))
        .collect();

    let LinearFit {
        slope,
        intercept,
        r_squared,
    } = linear_fit(&points)?;

    Ok(FatigueTrend {
        direction: TrendDirection::classify(slope, threshold),
        slope_bpm_per_s: slope,
        intercept_bpm: intercept,
        r_squared,
        threshold_bpm_per_s: threshold,
        smoothing_window: window,
        points: points.len(),
    })
}
