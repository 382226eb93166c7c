//! Session summary and the effort-distribution grid.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::stats::mean_defined;
use crate::types::{
    Column, DerivedSample, DerivedSeries, Metric, PowerSource, MAX_EFFORT_BINS,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub samples: usize,
    pub duration_s: f64,
    pub total_distance_m: Option<f64>,
    pub elevation_gain_m: Option<f64>,
    pub mean_heart_rate: Option<f64>,
    pub mean_cadence: Option<f64>,
    pub mean_power: Option<f64>,
    pub power_source: Option<PowerSource>,
}

pub fn session_summary(derived: &DerivedSeries) -> Result<SessionSummary, AnalysisError> {
    let last = derived.samples.last().ok_or(AnalysisError::InsufficientSamples {
        needed: 1,
        got: 0,
    })?;

    let total_distance_m = derived
        .samples
        .iter()
        .filter_map(|s| s.distance)
        .reduce(f64::max);
    let elevation_gain_m = derived.fields.altitude.then(|| {
        derived
            .samples
            .iter()
            .filter_map(|s| s.altitude_delta_m)
            .filter(|d| *d > 0.0)
            .sum::<f64>()
    });

    Ok(SessionSummary {
        samples: derived.len(),
        duration_s: last.elapsed_s,
        total_distance_m,
        elevation_gain_m,
        mean_heart_rate: mean_defined(derived.samples.iter().map(|s| s.heart_rate)),
        mean_cadence: mean_defined(derived.samples.iter().map(|s| s.cadence)),
        mean_power: mean_defined(derived.samples.iter().map(|s| s.power)),
        power_source: derived.power_source,
    })
}

/// Second axis of an effort grid (the first is always heart rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortAxis {
    Cadence,
    /// Per-sample distance delta, meters.
    DistanceDelta,
}

impl EffortAxis {
    fn value(self, s: &DerivedSample) -> Option<f64> {
        match self {
            EffortAxis::Cadence => s.cadence,
            EffortAxis::DistanceDelta => s.distance_delta_m,
        }
    }

    fn column(self) -> Column {
        match self {
            EffortAxis::Cadence => Column::Cadence,
            EffortAxis::DistanceDelta => Column::Distance,
        }
    }
}

/// 2-D histogram of heart rate against another signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffortGrid {
    pub y_axis: EffortAxis,
    /// `bins + 1` edges each.
    pub hr_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// `counts[hr_bin][y_bin]`
    pub counts: Vec<Vec<usize>>,
    pub points: usize,
}

fn edges(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
    let step = (hi - lo) / bins as f64;
    (0..=bins).map(|i| lo + step * i as f64).collect()
}

fn bin_of(v: f64, edges: &[f64]) -> usize {
    let bins = edges.len() - 1;
    let lo = edges[0];
    let step = (edges[bins] - lo) / bins as f64;
    (((v - lo) / step).floor() as usize).min(bins - 1)
}

pub fn effort_grid(
    derived: &DerivedSeries,
    y_axis: EffortAxis,
    bins: usize,
) -> Result<EffortGrid, AnalysisError> {
    derived
        .fields
        .require(Metric::EffortDistribution, &[Column::HeartRate, y_axis.column()])?;
    if bins == 0 || bins > MAX_EFFORT_BINS {
        return Err(AnalysisError::InvalidParameter(format!(
            "effort grid needs 1..={MAX_EFFORT_BINS} bins, got {bins}"
        )));
    }

    let points: Vec<(f64, f64)> = derived
        .samples
        .iter()
        .filter_map(|s| Some((s.heart_rate?, y_axis.value(s)?)))
        .collect();
    if points.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no sample has both heart rate and the second signal".into(),
        ));
    }

    let span = |f: fn(&(f64, f64)) -> f64| {
        points
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (hr_lo, hr_hi) = span(|p| p.0);
    let (y_lo, y_hi) = span(|p| p.1);
    let hr_edges = edges(hr_lo, hr_hi, bins);
    let y_edges = edges(y_lo, y_hi, bins);

    let mut counts = vec![vec![0usize; bins]; bins];
    for (hr, y) in &points {
        counts[bin_of(*hr, &hr_edges)][bin_of(*y, &y_edges)] += 1;
    }

    Ok(EffortGrid {
        y_axis,
        hr_edges,
        y_edges,
        counts,
        points: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_range_gets_unit_width() {
        let e = edges(5.0, 5.0, 2);
        assert_eq!(e, vec![4.5, 5.0, 5.5]);
        assert_eq!(bin_of(5.0, &e), 1);
    }

    #[test]
    fn max_value_lands_in_last_bin() {
        let e = edges(0.0, 10.0, 5);
        assert_eq!(bin_of(0.0, &e), 0);
        assert_eq!(bin_of(9.99, &e), 4);
        assert_eq!(bin_of(10.0, &e), 4);
    }
}
