//! Session aggregates: stability, windowed comparison, efficiency drop, best window.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AnalysisError;
use crate::segment::{partition, Window};
use crate::stats::{mean, mean_defined, quantile, sample_variance};
use crate::types::{DerivedSeries, Metric, PowerSource};

pub const STABILITY_METRICS: [Metric; 4] =
    [Metric::Cadence, Metric::HeartRate, Metric::Speed, Metric::Power];

/// Variance per metric. Metrics without data are listed in `unavailable`,
/// never reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityScores {
    pub variances: BTreeMap<Metric, f64>,
    pub unavailable: Vec<Metric>,
    pub power_source: Option<PowerSource>,
}

impl StabilityScores {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.variances.get(&metric).copied()
    }

    pub fn is_unavailable(&self, metric: Metric) -> bool {
        self.unavailable.contains(&metric)
    }
}

pub fn stability_scores(derived: &DerivedSeries) -> Result<StabilityScores, AnalysisError> {
    let mut variances = BTreeMap::new();
    let mut unavailable = Vec::new();
    for metric in STABILITY_METRICS {
        let var = if derived.is_available(metric) {
            sample_variance(&derived.values(metric))
        } else {
            None
        };
        match var {
            Some(v) => {
                variances.insert(metric, v);
            }
            None => unavailable.push(metric),
        }
    }
    if variances.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no metric has two or more defined samples".into(),
        ));
    }
    Ok(StabilityScores {
        variances,
        unavailable,
        power_source: derived.power_source,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub index: usize,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub start_elapsed_s: f64,
    pub end_elapsed_s: f64,
    pub mean_speed_kmh: Option<f64>,
    pub mean_hr_efficiency: Option<f64>,
    pub mean_cadence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowComparison {
    pub windows: Vec<WindowStats>,
}

impl WindowComparison {
    pub fn first(&self) -> Option<&WindowStats> {
        self.windows.first()
    }

    pub fn last(&self) -> Option<&WindowStats> {
        self.windows.last()
    }
}

fn window_label(index: usize, count: usize) -> String {
    match (count, index) {
        (3, 0) => "First Third".into(),
        (3, 1) => "Middle Third".into(),
        (3, 2) => "Last Third".into(),
        (2, 0) => "First Half".into(),
        (2, 1) => "Second Half".into(),
        _ => format!("Window {}", index + 1),
    }
}

/// Per-window means over `count` equal-count windows.
pub fn window_comparison(
    derived: &DerivedSeries,
    count: usize,
) -> Result<WindowComparison, AnalysisError> {
    let windows = partition(derived.len(), count)?;
    let stats = windows
        .iter()
        .map(|w: &Window| {
            let s = w.slice(&derived.samples);
            WindowStats {
                index: w.index,
                label: window_label(w.index, count),
                start: w.start,
                end: w.end,
                start_elapsed_s: s.first().map(|x| x.elapsed_s).unwrap_or_default(),
                end_elapsed_s: s.last().map(|x| x.elapsed_s).unwrap_or_default(),
                mean_speed_kmh: mean_defined(s.iter().map(|x| x.speed_kmh)),
                mean_hr_efficiency: mean_defined(s.iter().map(|x| x.hr_efficiency)),
                mean_cadence: mean_defined(s.iter().map(|x| x.cadence)),
            }
        })
        .collect();
    Ok(WindowComparison { windows: stats })
}

/// First-window minus last-window mean HR efficiency. Positive = efficiency degraded.
pub fn efficiency_drop(
    derived: &DerivedSeries,
    comparison: &WindowComparison,
) -> Result<f64, AnalysisError> {
    if let Some(reason) = derived.unavailable_reason(Metric::HrEfficiency) {
        return Err(reason.clone());
    }
    let first = comparison.first().and_then(|w| w.mean_hr_efficiency);
    let last = comparison.last().and_then(|w| w.mean_hr_efficiency);
    match (first, last) {
        (Some(f), Some(l)) => Ok(f - l),
        _ => Err(AnalysisError::InsufficientData(
            "first or last window has no hr_efficiency values".into(),
        )),
    }
}

/// Where the fastest samples of the session sit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWindow {
    pub quantile: f64,
    pub threshold_speed_kmh: f64,
    pub samples: usize,
    pub mean_elapsed_s: f64,
    pub first_elapsed_s: f64,
    pub last_elapsed_s: f64,
}

pub fn best_window(derived: &DerivedSeries, q: f64) -> Result<BestWindow, AnalysisError> {
    if let Some(reason) = derived.unavailable_reason(Metric::Speed) {
        return Err(reason.clone());
    }
    let speeds = derived.values(Metric::Speed);
    let threshold = quantile(&speeds, q).ok_or_else(|| {
        AnalysisError::InsufficientData("speed is undefined for every sample".into())
    })?;

    let elapsed: Vec<f64> = derived
        .samples
        .iter()
        .filter(|s| matches!(s.speed_kmh, Some(v) if v >= threshold))
        .map(|s| s.elapsed_s)
        .collect();
    let mean_elapsed_s = mean(elapsed.iter().copied()).ok_or_else(|| {
        AnalysisError::InsufficientData("no sample reaches the speed threshold".into())
    })?;

    Ok(BestWindow {
        quantile: q,
        threshold_speed_kmh: threshold,
        samples: elapsed.len(),
        mean_elapsed_s,
        first_elapsed_s: elapsed.iter().copied().fold(f64::INFINITY, f64::min),
        last_elapsed_s: elapsed.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
