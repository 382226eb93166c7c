//! Terrain classes from altitude deltas, and early vs late climbs.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::stats::mean_defined;
use crate::types::{Column, DerivedSample, DerivedSeries, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TerrainClass {
    Climb,
    Flat,
    Descent,
}

impl TerrainClass {
    pub const ALL: [TerrainClass; 3] =
        [TerrainClass::Climb, TerrainClass::Flat, TerrainClass::Descent];

    /// `Climb` above `+threshold_m`, `Descent` below `-threshold_m`.
    pub fn from_delta(altitude_delta_m: f64, threshold_m: f64) -> Self {
        if altitude_delta_m > threshold_m {
            TerrainClass::Climb
        } else if altitude_delta_m < -threshold_m {
            TerrainClass::Descent
        } else {
            TerrainClass::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainClassStats {
    pub class: TerrainClass,
    pub samples: usize,
    pub mean_heart_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainSummary {
    pub threshold_m: f64,
    pub classes: Vec<TerrainClassStats>,
    /// Samples whose altitude delta is undefined.
    pub unclassified_samples: usize,
}

impl TerrainSummary {
    pub fn class(&self, class: TerrainClass) -> Option<&TerrainClassStats> {
        self.classes.iter().find(|c| c.class == class)
    }
}

pub fn terrain_summary(
    derived: &DerivedSeries,
    threshold_m: f64,
) -> Result<TerrainSummary, AnalysisError> {
    derived.fields.require(Metric::Terrain, &[Column::Altitude])?;

    let labelled: Vec<(TerrainClass, &DerivedSample)> = derived
        .samples
        .iter()
        .filter_map(|s| {
            s.altitude_delta_m
                .map(|d| (TerrainClass::from_delta(d, threshold_m), s))
        })
        .collect();

    let classes = TerrainClass::ALL
        .iter()
        .map(|&class| {
            let members: Vec<&DerivedSample> = labelled
                .iter()
                .filter(|(c, _)| *c == class)
                .map(|(_, s)| *s)
                .collect();
            TerrainClassStats {
                class,
                samples: members.len(),
                mean_heart_rate: mean_defined(members.iter().map(|s| s.heart_rate)),
            }
        })
        .collect();

    Ok(TerrainSummary {
        threshold_m,
        classes,
        unclassified_samples: derived.len() - labelled.len(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbPeriodStats {
    pub samples: usize,
    pub mean_heart_rate: Option<f64>,
    pub mean_cadence: Option<f64>,
    pub mean_speed_kmh: Option<f64>,
}

impl ClimbPeriodStats {
    fn of(samples: &[&DerivedSample]) -> Self {
        Self {
            samples: samples.len(),
            mean_heart_rate: mean_defined(samples.iter().map(|s| s.heart_rate)),
            mean_cadence: mean_defined(samples.iter().map(|s| s.cadence)),
            mean_speed_kmh: mean_defined(samples.iter().map(|s| s.speed_kmh)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbComparison {
    pub grade_threshold_pct: f64,
    pub midpoint_elapsed_s: f64,
    pub early: ClimbPeriodStats,
    pub late: ClimbPeriodStats,
}

/// Climbing samples (grade above threshold) split at the session's time midpoint.
/// Skipped when either half has no climbing samples.
pub fn climb_comparison(
    derived: &DerivedSeries,
    grade_threshold_pct: f64,
) -> Result<ClimbComparison, AnalysisError> {
    if let Some(reason) = derived.unavailable_reason(Metric::Grade) {
        return Err(reason.clone());
    }
    let midpoint_elapsed_s = derived.samples.last().map(|s| s.elapsed_s).unwrap_or_default() / 2.0;

    let (early, late): (Vec<&DerivedSample>, Vec<&DerivedSample>) = derived
        .samples
        .iter()
        .filter(|s| matches!(s.grade_pct, Some(g) if g > grade_threshold_pct))
        .partition(|s| s.elapsed_s <= midpoint_elapsed_s);

    if early.is_empty() || late.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "climbs above {grade_threshold_pct}% grade: {} early, {} late",
            early.len(),
            late.len()
        )));
    }

    Ok(ClimbComparison {
        grade_threshold_pct,
        midpoint_elapsed_s,
        early: ClimbPeriodStats::of(&early),
        late: ClimbPeriodStats::of(&late),
    })
}
