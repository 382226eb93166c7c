use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{BestWindow, StabilityScores, WindowComparison};
use crate::error::AnalysisError;
use crate::segment::Segment;
use crate::simulate::{Simulation, SimulationModel};
use crate::summary::{EffortGrid, SessionSummary};
use crate::terrain::{ClimbComparison, TerrainSummary};
use crate::trend::FatigueTrend;
use crate::zones::{Zone, ZoneDistribution, ZoneTable};

/// Raw input columns the engine knows how to use (after alias resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    HeartRate,
    Cadence,
    Distance,
    Altitude,
    Power,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::HeartRate,
        Column::Cadence,
        Column::Distance,
        Column::Altitude,
        Column::Power,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::HeartRate => "heart_rate",
            Column::Cadence => "cadence",
            Column::Distance => "distance",
            Column::Altitude => "altitude",
            Column::Power => "power",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the engine derives from the raw columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HeartRate,
    Cadence,
    Speed,
    Pace,
    Grade,
    Power,
    HrZone,
    HrEfficiency,
    SessionEfficiency,
    Terrain,
    HrTrend,
    EffortDistribution,
    Simulation,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::HeartRate => "heart_rate",
            Metric::Cadence => "cadence",
            Metric::Speed => "speed_kmh",
            Metric::Pace => "pace_sec_per_km",
            Metric::Grade => "grade_pct",
            Metric::Power => "power",
            Metric::HrZone => "hr_zone",
            Metric::HrEfficiency => "hr_efficiency",
            Metric::SessionEfficiency => "session_efficiency",
            Metric::Terrain => "terrain",
            Metric::HrTrend => "hr_trend",
            Metric::EffortDistribution => "effort_distribution",
            Metric::Simulation => "simulation",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which raw columns exist in the session (at least one numeric value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub heart_rate: bool,
    pub cadence: bool,
    pub distance: bool,
    pub altitude: bool,
    pub power: bool,
}

impl FieldSet {
    pub fn has(&self, column: Column) -> bool {
        match column {
            Column::HeartRate => self.heart_rate,
            Column::Cadence => self.cadence,
            Column::Distance => self.distance,
            Column::Altitude => self.altitude,
            Column::Power => self.power,
        }
    }

    pub fn set(&mut self, column: Column) {
        match column {
            Column::HeartRate => self.heart_rate = true,
            Column::Cadence => self.cadence = true,
            Column::Distance => self.distance = true,
            Column::Altitude => self.altitude = true,
            Column::Power => self.power = true,
        }
    }

    /// `Ok(())` when every column is present, else the first missing one as
    /// `MetricUnavailable` for `metric`.
    pub fn require(&self, metric: Metric, columns: &[Column]) -> Result<(), AnalysisError> {
        match columns.iter().find(|c| !self.has(**c)) {
            Some(missing) => Err(AnalysisError::unavailable(metric, *missing)),
            None => Ok(()),
        }
    }
}

/// One sensor reading as delivered by the file parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub time: DateTime<Utc>,
    pub heart_rate: Option<f64>, // bpm
    pub cadence: Option<f64>,    // steps/min
    pub distance: Option<f64>,   // cumulative meters
    pub altitude: Option<f64>,   // meters
    pub power: Option<f64>,      // watts, measured
}

impl RawSample {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            time,
            heart_rate: None,
            cadence: None,
            distance: None,
            altitude: None,
            power: None,
        }
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::HeartRate => self.heart_rate,
            Column::Cadence => self.cadence,
            Column::Distance => self.distance,
            Column::Altitude => self.altitude,
            Column::Power => self.power,
        }
    }
}

/// Chronologically sorted samples; `elapsed_s[0] == 0`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Series {
    pub samples: Vec<RawSample>,
    pub elapsed_s: Vec<f64>,
    pub fields: FieldSet,
}

impl Series {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RawSample, f64)> + '_ {
        self.samples.iter().zip(self.elapsed_s.iter().copied())
    }
}

/// Whether `power` on a derived sample came from the device or the cubic-speed estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSource {
    Measured,
    /// `speed_m_s^3`, arbitrary units. Relative scaling only.
    Modeled,
}

/// A raw sample plus everything derived from it and its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSample {
    pub time: DateTime<Utc>,
    pub elapsed_s: f64,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub distance: Option<f64>,
    pub altitude: Option<f64>,

    /// 0 for the first sample.
    pub time_delta_s: f64,
    pub distance_delta_m: Option<f64>,
    pub altitude_delta_m: Option<f64>,

    pub speed_kmh: Option<f64>,
    pub pace_sec_per_km: Option<f64>,
    pub pace_smoothed_sec_per_km: Option<f64>,
    pub grade_pct: Option<f64>,
    pub power: Option<f64>,
    pub hr_zone: Option<Zone>,
    pub hr_efficiency: Option<f64>,
    pub session_efficiency: Option<f64>,
}

impl DerivedSample {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::HeartRate => self.heart_rate,
            Metric::Cadence => self.cadence,
            Metric::Speed => self.speed_kmh,
            Metric::Pace => self.pace_smoothed_sec_per_km,
            Metric::Grade => self.grade_pct,
            Metric::Power => self.power,
            Metric::HrEfficiency => self.hr_efficiency,
            Metric::SessionEfficiency => self.session_efficiency,
            _ => None,
        }
    }
}

/// Output of the derived-metric stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivedSeries {
    pub samples: Vec<DerivedSample>,
    pub fields: FieldSet,
    /// Session-level `MetricUnavailable` conditions.
    pub unavailable: Vec<AnalysisError>,
    pub power_source: Option<PowerSource>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_available(&self, metric: Metric) -> bool {
        !self.unavailable.iter().any(|e| {
            matches!(e, AnalysisError::MetricUnavailable { metric: m, .. } if *m == metric)
        })
    }

    /// The session-level unavailability reason for `metric`, if any.
    pub fn unavailable_reason(&self, metric: Metric) -> Option<&AnalysisError> {
        self.unavailable.iter().find(|e| {
            matches!(e, AnalysisError::MetricUnavailable { metric: m, .. } if *m == metric)
        })
    }

    /// Defined values of `metric`, in order.
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.metric(metric)).collect()
    }
}

/// Upper bound on effort-grid bins per axis; the grid holds `bins * bins` cells.
pub const MAX_EFFORT_BINS: usize = 1000;

/// Analysis configuration. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cfg {
    pub zone_table: ZoneTable,
    pub pace_smoothing_window: usize,
    pub window_count: usize,
    pub best_window_quantile: f64,
    pub terrain_threshold_m: f64,
    pub climb_grade_pct: f64,
    pub trend_window: usize,
    /// bpm per second
    pub trend_slope_threshold: f64,
    pub simulation_model: SimulationModel,
    pub simulation_window: usize,
    pub effort_bins: usize,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            zone_table: ZoneTable::coros(),
            pace_smoothing_window: 5,
            window_count: 3,
            best_window_quantile: 0.95,
            terrain_threshold_m: 0.3,
            climb_grade_pct: 1.0,
            trend_window: 10,
            trend_slope_threshold: 0.02,
            simulation_model: SimulationModel::ConstantPace,
            simulation_window: 5,
            effort_bins: 10,
        }
    }
}

impl Cfg {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let windows = [
            ("pace_smoothing_window", self.pace_smoothing_window),
            ("window_count", self.window_count),
            ("trend_window", self.trend_window),
            ("simulation_window", self.simulation_window),
            ("effort_bins", self.effort_bins),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(AnalysisError::InvalidParameter(format!("{name} must be >= 1")));
        }
        if self.effort_bins > MAX_EFFORT_BINS {
            return Err(AnalysisError::InvalidParameter(format!(
                "effort_bins must be <= {MAX_EFFORT_BINS}, got {}",
                self.effort_bins
            )));
        }
        if !(0.0..=1.0).contains(&self.best_window_quantile) {
            return Err(AnalysisError::InvalidParameter(format!(
                "best_window_quantile must be within [0, 1], got {}",
                self.best_window_quantile
            )));
        }
        let thresholds = [
            ("terrain_threshold_m", self.terrain_threshold_m),
            ("trend_slope_threshold", self.trend_slope_threshold),
        ];
        for (name, v) in thresholds {
            if !v.is_finite() || v < 0.0 {
                return Err(AnalysisError::InvalidParameter(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        if !self.climb_grade_pct.is_finite() {
            return Err(AnalysisError::InvalidParameter("climb_grade_pct must be finite".into()));
        }
        self.zone_table.validate()
    }
}

/// An aggregate that was either computed or skipped for a named reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    Skipped(AnalysisError),
}

impl<T> Outcome<T> {
    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&AnalysisError> {
        match self {
            Outcome::Computed(_) => None,
            Outcome::Skipped(e) => Some(e),
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Outcome<T> {
    fn from(r: Result<T, AnalysisError>) -> Self {
        match r {
            Ok(v) => Outcome::Computed(v),
            Err(e) => Outcome::Skipped(e),
        }
    }
}

/// Everything the rendering layer needs for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub sample_count: usize,
    pub fields: FieldSet,
    pub zone_table: String,
    pub power_source: Option<PowerSource>,
    pub unavailable_metrics: Vec<AnalysisError>,
    pub samples: Vec<DerivedSample>,
    pub segments: Vec<Segment>,

    pub summary: Outcome<SessionSummary>,
    pub stability: Outcome<StabilityScores>,
    pub windows: Outcome<WindowComparison>,
    pub efficiency_drop: Outcome<f64>,
    pub best_window: Outcome<BestWindow>,
    pub terrain: Outcome<TerrainSummary>,
    pub climbs: Outcome<ClimbComparison>,
    pub fatigue: Outcome<FatigueTrend>,
    pub time_in_zone: Outcome<ZoneDistribution>,
    pub effort_hr_cadence: Outcome<EffortGrid>,
    pub effort_hr_distance: Outcome<EffortGrid>,
    pub simulation: Outcome<Simulation>,
}

impl SessionReport {
    /// Name and reason of every aggregate that was not computed.
    pub fn skipped(&self) -> Vec<(&'static str, &AnalysisError)> {
        let all = [
            ("summary", self.summary.reason()),
            ("stability", self.stability.reason()),
            ("windows", self.windows.reason()),
            ("efficiency_drop", self.efficiency_drop.reason()),
            ("best_window", self.best_window.reason()),
            ("terrain", self.terrain.reason()),
            ("climbs", self.climbs.reason()),
            ("fatigue", self.fatigue.reason()),
            ("time_in_zone", self.time_in_zone.reason()),
            ("effort_hr_cadence", self.effort_hr_cadence.reason()),
            ("effort_hr_distance", self.effort_hr_distance.reason()),
            ("simulation", self.simulation.reason()),
        ];
        all.into_iter()
            .filter_map(|(name, reason)| reason.map(|r| (name, r)))
            .collect()
    }
}
