//! Training telemetry analytics: normalizes one session's raw sensor samples,
//! derives pace/speed/grade/power/efficiency, classifies heart-rate zones and
//! aggregates the result into the panels of the session report.

pub mod aggregate;
pub mod analyze_session;
pub mod cli;
pub mod config;
pub mod derive;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod segment;
pub mod simulate;
pub mod smoothing;
pub mod stats;
pub mod summary;
pub mod table;
pub mod terrain;
pub mod trend;
pub mod types;
pub mod zones;

#[cfg(feature = "python")]
mod py;

pub use analyze_session::{
    analyze_series, analyze_session, analyze_session_json, analyze_session_with_metrics,
    parse_cfg,
};
pub use cli::print_session_report;
pub use derive::derive_metrics;
pub use error::AnalysisError;
pub use metrics::EngineMetrics;
pub use normalize::normalize;
pub use segment::{partition, zone_runs, Segment, Window};
pub use simulate::{simulate, SimulationModel};
pub use table::{Cell, RawTable};
pub use types::{
    Cfg, Column, DerivedSample, DerivedSeries, FieldSet, Metric, Outcome, PowerSource, RawSample,
    SessionReport, Series,
};
pub use zones::{classify, Zone, ZoneTable};
