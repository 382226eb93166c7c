use pacelens_core::aggregate::{best_window, efficiency_drop, stability_scores, window_comparison};
use pacelens_core::summary::{effort_grid, session_summary, EffortAxis};
use pacelens_core::terrain::{climb_comparison, terrain_summary, TerrainClass};
use pacelens_core::trend::{fatigue_trend, TrendDirection};
use pacelens_core::{
    derive_metrics, normalize, AnalysisError, Cfg, Column, DerivedSeries, Metric, RawTable,
};
use serde_json::json;

const T0: i64 = 1_714_557_600;

fn derive(rows: Vec<serde_json::Value>) -> DerivedSeries {
    let table = RawTable::from_json_value(&json!(rows)).unwrap();
    derive_metrics(&normalize(&table).unwrap(), &Cfg::default())
}

/// 1 Hz, 3 m/s, heart rate from `hr(i)`.
fn steady_run(n: i64, hr: impl Fn(i64) -> f64) -> DerivedSeries {
    derive(
        (0..n)
            .map(|i| json!({"timestamp": T0 + i, "distance": 3.0 * i as f64, "heart_rate": hr(i)}))
            .collect(),
    )
}

#[test]
fn efficiency_drop_is_positive_when_hr_drifts_up() {
    let d = steady_run(30, |i| 120.0 + 2.0 * i as f64);
    let cmp = window_comparison(&d, 3).unwrap();
    assert_eq!(cmp.windows.len(), 3);
    assert_eq!(cmp.windows[0].label, "First Third");
    assert_eq!(cmp.windows[2].label, "Last Third");

    let drop = efficiency_drop(&d, &cmp).unwrap();
    assert!(drop > 0.0, "drop = {drop}");
}

#[test]
fn efficiency_drop_is_exactly_zero_for_constant_efficiency() {
    let d = steady_run(30, |_| 150.0);
    let cmp = window_comparison(&d, 3).unwrap();
    assert_eq!(efficiency_drop(&d, &cmp).unwrap(), 0.0);
}

#[test]
fn efficiency_drop_without_heart_rate_names_the_column() {
    let d = derive(
        (0..9)
            .map(|i| json!({"timestamp": T0 + i, "distance": 2.0 * i as f64}))
            .collect(),
    );
    let cmp = window_comparison(&d, 3).unwrap();
    assert_eq!(
        efficiency_drop(&d, &cmp).unwrap_err(),
        AnalysisError::unavailable(Metric::HrEfficiency, Column::HeartRate)
    );
}

#[test]
fn window_comparison_with_two_samples_is_skipped() {
    let d = steady_run(2, |_| 140.0);
    assert_eq!(
        window_comparison(&d, 3).unwrap_err(),
        AnalysisError::InsufficientSamples { needed: 3, got: 2 }
    );
}

#[test]
fn stability_uses_sample_variance() {
    let d = derive(vec![
        json!({"timestamp": T0,     "cadence": 170, "heart_rate": 140}),
        json!({"timestamp": T0 + 1, "cadence": 172, "heart_rate": 140}),
        json!({"timestamp": T0 + 2, "cadence": 174, "heart_rate": 140}),
    ]);
    let s = stability_scores(&d).unwrap();
    assert_eq!(s.get(Metric::Cadence), Some(4.0));
    assert_eq!(s.get(Metric::HeartRate), Some(0.0));
    assert!(s.is_unavailable(Metric::Speed));
    assert!(s.is_unavailable(Metric::Power));
}

#[test]
fn best_window_finds_the_fast_block() {
    let mut dist = 0.0;
    let rows = (0..20)
        .map(|i| {
            if i > 0 {
                dist += if i == 10 || i == 11 { 5.0 } else { 2.0 };
            }
            json!({"timestamp": T0 + i, "distance": dist})
        })
        .collect();
    let d = derive(rows);
    let best = best_window(&d, 0.95).unwrap();
    assert!((best.threshold_speed_kmh - 18.0).abs() < 1e-9);
    assert_eq!(best.samples, 2);
    assert_eq!(best.mean_elapsed_s, 10.5);
    assert_eq!((best.first_elapsed_s, best.last_elapsed_s), (10.0, 11.0));
}

fn hilly() -> DerivedSeries {
    // +0.5 m per 10 m early and late, one descent in between
    let mut alt = 100.0;
    let rows = (0..20)
        .map(|i| {
            alt += match i {
                2 | 3 | 15 | 16 => 0.5,
                8 => -1.0,
                _ => 0.0,
            };
            let hr = if i < 10 { 130.0 } else { 150.0 };
            json!({
                "timestamp": T0 + i,
                "distance": 10.0 * i as f64,
                "enhanced_altitude": alt,
                "heart_rate": hr,
            })
        })
        .collect();
    derive(rows)
}

#[test]
fn terrain_classes_by_altitude_delta() {
    let t = terrain_summary(&hilly(), 0.3).unwrap();
    assert_eq!(t.class(TerrainClass::Climb).unwrap().samples, 4);
    assert_eq!(t.class(TerrainClass::Descent).unwrap().samples, 1);
    assert_eq!(t.class(TerrainClass::Flat).unwrap().samples, 15);
    assert_eq!(t.unclassified_samples, 0);
    assert_eq!(t.class(TerrainClass::Descent).unwrap().mean_heart_rate, Some(130.0));
}

#[test]
fn terrain_needs_altitude() {
    let d = steady_run(5, |_| 140.0);
    assert_eq!(
        terrain_summary(&d, 0.3).unwrap_err(),
        AnalysisError::unavailable(Metric::Terrain, Column::Altitude)
    );
}

#[test]
fn early_and_late_climbs_split_at_half_time() {
    let c = climb_comparison(&hilly(), 1.0).unwrap();
    assert_eq!(c.midpoint_elapsed_s, 9.5);
    assert_eq!(c.early.samples, 2);
    assert_eq!(c.late.samples, 2);
    assert_eq!(c.early.mean_heart_rate, Some(130.0));
    assert_eq!(c.late.mean_heart_rate, Some(150.0));
}

#[test]
fn no_climbs_above_threshold_is_insufficient() {
    let c = climb_comparison(&hilly(), 6.0);
    assert!(matches!(c, Err(AnalysisError::InsufficientData(_))), "{c:?}");
}

#[test]
fn fatigue_trend_rising_and_stable() {
    let rising = fatigue_trend(&steady_run(100, |i| 100.0 + 0.8 * i as f64), 10, 0.02).unwrap();
    assert_eq!(rising.direction, TrendDirection::Rising);
    assert!(rising.slope_bpm_per_s > 0.5);
    assert_eq!(rising.points, 100);

    let flat = fatigue_trend(&steady_run(100, |_| 140.0), 10, 0.02).unwrap();
    assert_eq!(flat.direction, TrendDirection::Stable);
    assert_eq!(flat.slope_bpm_per_s, 0.0);
    assert_eq!(flat.r_squared, None);
}

#[test]
fn fatigue_trend_needs_two_points() {
    let d = steady_run(1, |_| 140.0);
    assert_eq!(
        fatigue_trend(&d, 10, 0.02).unwrap_err(),
        AnalysisError::InsufficientSamples { needed: 2, got: 1 }
    );
}

#[test]
fn summary_totals() {
    let s = session_summary(&hilly()).unwrap();
    assert_eq!(s.samples, 20);
    assert_eq!(s.duration_s, 19.0);
    assert_eq!(s.total_distance_m, Some(190.0));
    assert_eq!(s.elevation_gain_m, Some(2.0));
    assert_eq!(s.mean_heart_rate, Some(140.0));
    assert_eq!(s.mean_cadence, None);
}

#[test]
fn effort_grid_counts_every_pair_once() {
    let d = derive(
        (0..12)
            .map(|i| json!({"timestamp": T0 + i, "heart_rate": 120 + i, "cadence": 160 + (i % 4)}))
            .collect(),
    );
    let g = effort_grid(&d, EffortAxis::Cadence, 4).unwrap();
    assert_eq!(g.points, 12);
    assert_eq!(g.hr_edges.len(), 5);
    assert_eq!(g.counts.iter().flatten().sum::<usize>(), 12);

    assert_eq!(
        effort_grid(&d, EffortAxis::DistanceDelta, 4).unwrap_err(),
        AnalysisError::unavailable(Metric::EffortDistribution, Column::Distance)
    );
    assert!(matches!(
        effort_grid(&d, EffortAxis::Cadence, 1_000_000),
        Err(AnalysisError::InvalidParameter(_))
    ));
}
