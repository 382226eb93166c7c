use log::{info, warn};
use serde::Serialize;

use crate::aggregate::{best_window, efficiency_drop, stability_scores, window_comparison};
use crate::derive::derive_metrics;
use crate::error::AnalysisError;
use crate::metrics::EngineMetrics;
use crate::normalize::normalize;
use crate::segment::zone_runs;
use crate::simulate::simulate;
use crate::summary::{effort_grid, session_summary, EffortAxis};
use crate::table::RawTable;
use crate::terrain::{climb_comparison, terrain_summary};
use crate::trend::fatigue_trend;
use crate::types::{Cfg, Outcome, SessionReport, Series};
use crate::zones::time_in_zone;

/// Full pipeline over one raw table.
///
/// Only a missing or unparseable time axis (or an invalid config) fails the
/// session; every other condition is reported per aggregate.
pub fn analyze_session(table: &RawTable, cfg: &Cfg) -> Result<SessionReport, AnalysisError> {
    analyze_session_with_metrics(table, cfg, None)
}

pub fn analyze_session_with_metrics(
    table: &RawTable,
    cfg: &Cfg,
    metrics: Option<&EngineMetrics>,
) -> Result<SessionReport, AnalysisError> {
    let result = cfg
        .validate()
        .and_then(|_| normalize(table))
        .map(|series| analyze_series(&series, cfg));

    match (&result, metrics) {
        (Ok(report), Some(m)) => m.record_session(report),
        (Err(_), Some(m)) => m.record_failure(),
        _ => {}
    }
    if let Err(e) = &result {
        warn!("analyze_session: session aborted: {e}");
    }
    result
}

/// Everything downstream of the normalizer.
pub fn analyze_series(series: &Series, cfg: &Cfg) -> SessionReport {
    let derived = derive_metrics(series, cfg);
    let segments = zone_runs(&derived.samples);

    let windows = window_comparison(&derived, cfg.window_count);
    let eff_drop = match &windows {
        Ok(cmp) => efficiency_drop(&derived, cmp),
        Err(e) => Err(e.clone()),
    };

    let report = SessionReport {
        sample_count: derived.len(),
        fields: derived.fields,
        zone_table: cfg.zone_table.name.clone(),
        power_source: derived.power_source,
        unavailable_metrics: derived.unavailable.clone(),
        summary: session_summary(&derived).into(),
        stability: stability_scores(&derived).into(),
        windows: Outcome::from(windows),
        efficiency_drop: eff_drop.into(),
        best_window: best_window(&derived, cfg.best_window_quantile).into(),
        terrain: terrain_summary(&derived, cfg.terrain_threshold_m).into(),
        climbs: climb_comparison(&derived, cfg.climb_grade_pct).into(),
        fatigue: fatigue_trend(&derived, cfg.trend_window, cfg.trend_slope_threshold).into(),
        time_in_zone: time_in_zone(&derived, &cfg.zone_table).into(),
        effort_hr_cadence: effort_grid(&derived, EffortAxis::Cadence, cfg.effort_bins).into(),
        effort_hr_distance: effort_grid(&derived, EffortAxis::DistanceDelta, cfg.effort_bins)
            .into(),
        simulation: simulate(&derived, cfg.simulation_model, cfg.simulation_window).into(),
        segments,
        samples: derived.samples,
    };

    for (name, reason) in report.skipped() {
        warn!("analyze_session: `{name}` skipped: {reason}");
    }
    info!(
        "analyze_session: {} samples, {} segments, {} aggregates skipped",
        report.sample_count,
        report.segments.len(),
        report.skipped().len()
    );
    report
}

/// Parses a JSON config; empty or missing fields take their defaults.
pub fn parse_cfg(json: &str) -> Result<Cfg, AnalysisError> {
    let de = &mut serde_json::Deserializer::from_str(json);
    let cfg: Cfg = serde_path_to_error::deserialize(de)?;
    Ok(cfg)
}

#[derive(Serialize)]
struct Envelope<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a SessionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a AnalysisError>,
}

/// JSON in, JSON out: `{"ok": true, "report": ...}` or `{"ok": false, "error": ...}`.
///
/// `samples_json` is an array of records. Analysis failures land in the
/// envelope; only serialization itself can fail.
pub fn analyze_session_json(
    samples_json: &str,
    cfg_json: Option<&str>,
    metrics: Option<&EngineMetrics>,
) -> Result<String, serde_json::Error> {
    let input = cfg_json
        .map(parse_cfg)
        .transpose()
        .map(Option::unwrap_or_default)
        .and_then(|cfg| Ok((cfg, RawTable::from_json_records(samples_json)?)));
    let result = match input {
        Ok((cfg, table)) => analyze_session_with_metrics(&table, &cfg, metrics),
        Err(e) => {
            warn!("analyze_session: rejected input: {e}");
            if let Some(m) = metrics {
                m.record_failure();
            }
            Err(e)
        }
    };

    let envelope = match &result {
        Ok(report) => Envelope {
            ok: true,
            report: Some(report),
            error: None,
        },
        Err(e) => Envelope {
            ok: false,
            report: None,
            error: Some(e),
        },
    };
    serde_json::to_string(&envelope)
}
