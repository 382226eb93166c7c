//! Heart-rate zones: boundary tables, classification and time-in-zone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::stats::mean_defined;
use crate::types::{Column, DerivedSeries, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
    Z6,
}

impl Zone {
    pub const ALL: [Zone; 6] = [Zone::Z1, Zone::Z2, Zone::Z3, Zone::Z4, Zone::Z5, Zone::Z6];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::Z1 => "Z1 Recovery",
            Zone::Z2 => "Z2 Endurance",
            Zone::Z3 => "Z3 Tempo",
            Zone::Z4 => "Z4 Threshold",
            Zone::Z5 => "Z5 VO2 Max",
            Zone::Z6 => "Z6 Anaerobic",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seven ascending boundaries defining six half-open buckets `[b[i], b[i+1])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub name: String,
    pub boundaries: [f64; 7],
}

impl ZoneTable {
    pub fn new(name: impl Into<String>, boundaries: [f64; 7]) -> Result<Self, AnalysisError> {
        let table = Self {
            name: name.into(),
            boundaries,
        };
        table.validate()?;
        Ok(table)
    }

    /// COROS 6-zone model.
    pub fn coros() -> Self {
        Self {
            name: "coros".into(),
            boundaries: [0.0, 102.0, 120.0, 138.0, 156.0, 174.0, 300.0],
        }
    }

    /// Evenly spaced 20 bpm zones.
    pub fn even() -> Self {
        Self {
            name: "even".into(),
            boundaries: [0.0, 100.0, 120.0, 140.0, 160.0, 180.0, 300.0],
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "coros" => Some(Self::coros()),
            "even" => Some(Self::even()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let b = &self.boundaries;
        if b.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::InvalidParameter(format!(
                "zone table `{}` has non-finite boundaries",
                self.name
            )));
        }
        if b.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::InvalidParameter(format!(
                "zone table `{}` boundaries must be strictly increasing",
                self.name
            )));
        }
        Ok(())
    }

    /// `[lower, upper)` of a zone.
    pub fn bounds(&self, zone: Zone) -> (f64, f64) {
        let i = zone.index();
        (self.boundaries[i], self.boundaries[i + 1])
    }

    /// Zone of a heart rate. Out-of-range and NaN are unclassified, never clamped.
    pub fn classify(&self, heart_rate: f64) -> Option<Zone> {
        if !heart_rate.is_finite() {
            return None;
        }
        Zone::ALL.into_iter().find(|z| {
            let (lo, hi) = self.bounds(*z);
            heart_rate >= lo && heart_rate < hi
        })
    }
}

/// Free-function form of [`ZoneTable::classify`].
pub fn classify(heart_rate: f64, table: &ZoneTable) -> Option<Zone> {
    table.classify(heart_rate)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneShare {
    pub zone: Zone,
    pub label: &'static str,
    pub lower_bpm: f64,
    pub upper_bpm: f64,
    pub samples: usize,
    pub seconds: f64,
    /// Share of classified samples, percent.
    pub share_pct: f64,
    pub mean_hr_efficiency: Option<f64>,
    pub mean_session_efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDistribution {
    pub table: String,
    pub zones: Vec<ZoneShare>,
    pub classified_samples: usize,
    pub unclassified_samples: usize,
}

/// Time in each zone plus per-zone efficiency.
pub fn time_in_zone(
    derived: &DerivedSeries,
    table: &ZoneTable,
) -> Result<ZoneDistribution, AnalysisError> {
    derived.fields.require(Metric::HrZone, &[Column::HeartRate])?;

    let classified = derived.samples.iter().filter(|s| s.hr_zone.is_some()).count();
    if classified == 0 {
        return Err(AnalysisError::InsufficientData(
            "no heart-rate sample falls inside the zone table".into(),
        ));
    }

    let zones = Zone::ALL
        .iter()
        .map(|&zone| {
            let in_zone: Vec<_> = derived
                .samples
                .iter()
                .filter(|s| s.hr_zone == Some(zone))
                .collect();
            let (lower_bpm, upper_bpm) = table.bounds(zone);
            ZoneShare {
                zone,
                label: zone.label(),
                lower_bpm,
                upper_bpm,
                samples: in_zone.len(),
                seconds: in_zone.iter().map(|s| s.time_delta_s).sum(),
                share_pct: in_zone.len() as f64 * 100.0 / classified as f64,
                mean_hr_efficiency: mean_defined(in_zone.iter().map(|s| s.hr_efficiency)),
                mean_session_efficiency: mean_defined(
                    in_zone.iter().map(|s| s.session_efficiency),
                ),
            }
        })
        .collect();

    Ok(ZoneDistribution {
        table: table.name.clone(),
        zones,
        classified_samples: classified,
        unclassified_samples: derived.len() - classified,
    })
}
