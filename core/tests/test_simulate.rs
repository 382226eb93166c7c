use pacelens_core::{
    derive_metrics, normalize, simulate, AnalysisError, Cfg, Column, DerivedSeries, Metric,
    RawTable, SimulationModel,
};
use serde_json::json;

const T0: i64 = 1_714_557_600;

fn derive(distances: &[Option<f64>]) -> DerivedSeries {
    let rows: Vec<_> = distances
        .iter()
        .enumerate()
        .map(|(i, d)| json!({"timestamp": T0 + 5 * i as i64, "distance": d}))
        .collect();
    let table = RawTable::from_json_value(&json!(rows)).unwrap();
    derive_metrics(&normalize(&table).unwrap(), &Cfg::default())
}

#[test]
fn constant_pace_reproduces_a_steady_run() {
    let dist: Vec<_> = (0..20).map(|i| Some(100.0 + 12.5 * i as f64)).collect();
    let sim = simulate(&derive(&dist), SimulationModel::ConstantPace, 5).unwrap();

    assert_eq!(sim.simulated_m.len(), 20);
    for (s, a) in sim.simulated_m.iter().zip(&sim.actual_m) {
        assert!((s - a.unwrap()).abs() < 1e-9);
    }
    assert!((sim.projected_finish_s - sim.actual_finish_s).abs() < 1e-9);
    assert!(sim.difference_s().abs() < 1e-9);
}

#[test]
fn even_effort_reproduces_a_steady_run() {
    let dist: Vec<_> = (0..20).map(|i| Some(100.0 + 12.5 * i as f64)).collect();
    let sim = simulate(&derive(&dist), SimulationModel::EvenEffort, 5).unwrap();

    assert_eq!(sim.simulated_m.len(), 20);
    for (i, (s, a)) in sim.simulated_m.iter().zip(&sim.actual_m).enumerate() {
        assert!((s - a.unwrap()).abs() < 1e-9, "sample {i}: {s} vs {a:?}");
    }
    assert!(sim.difference_s().abs() < 1e-9);
}

#[test]
fn constant_pace_ends_at_actual_total_for_uneven_runs() {
    let dist = [0.0, 5.0, 30.0, 31.0, 60.0, 90.0, 91.0, 120.0];
    let dist: Vec<_> = dist.iter().copied().map(Some).collect();
    let sim = simulate(&derive(&dist), SimulationModel::ConstantPace, 5).unwrap();

    assert!((sim.simulated_total_m - 120.0).abs() < 1e-9);
    assert!((sim.projected_finish_s - 35.0).abs() < 1e-9);
    let steps: Vec<_> = sim.simulated_m.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(steps.iter().all(|s| (s - steps[0]).abs() < 1e-9));
}

#[test]
fn even_effort_smooths_the_increments() {
    let dist = [0.0, 5.0, 30.0, 31.0, 60.0, 90.0, 91.0, 120.0];
    let dist: Vec<_> = dist.iter().copied().map(Some).collect();
    let sim = simulate(&derive(&dist), SimulationModel::EvenEffort, 3).unwrap();

    assert_eq!(sim.model, SimulationModel::EvenEffort);
    assert_eq!(sim.simulated_m[0], 0.0);
    assert!(sim.simulated_m.windows(2).all(|w| w[1] > w[0]));
    assert!(sim.projected_finish_s > 0.0);
}

#[test]
fn no_movement_cannot_be_projected() {
    let dist = vec![Some(0.0); 6];
    assert!(matches!(
        simulate(&derive(&dist), SimulationModel::ConstantPace, 5),
        Err(AnalysisError::DivisionUndefined(_))
    ));
}

#[test]
fn gaps_in_distance_are_tolerated() {
    let dist = [Some(0.0), Some(10.0), None, Some(30.0), Some(40.0)];
    let sim = simulate(&derive(&dist), SimulationModel::EvenEffort, 3).unwrap();
    assert_eq!(sim.actual_total_m, 40.0);
    assert_eq!(sim.actual_m[2], None);
    assert!(sim.simulated_m.iter().all(|v| v.is_finite()));
}

#[test]
fn simulation_requires_distance() {
    let rows: Vec<_> = (0..4)
        .map(|i| json!({"timestamp": T0 + i, "heart_rate": 130}))
        .collect();
    let table = RawTable::from_json_value(&json!(rows)).unwrap();
    let d = derive_metrics(&normalize(&table).unwrap(), &Cfg::default());
    assert_eq!(
        simulate(&d, SimulationModel::ConstantPace, 5).unwrap_err(),
        AnalysisError::unavailable(Metric::Simulation, Column::Distance)
    );
}

#[test]
fn single_sample_is_insufficient() {
    let sim = simulate(&derive(&[Some(5.0)]), SimulationModel::ConstantPace, 5);
    assert_eq!(
        sim.unwrap_err(),
        AnalysisError::InsufficientSamples { needed: 2, got: 1 }
    );
}
