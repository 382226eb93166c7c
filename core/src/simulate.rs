//! What-if pacing: idealised cumulative distance and projected finish time.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::smoothing::centered_mean;
use crate::stats::mean_defined;
use crate::types::{Column, DerivedSeries, Metric};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationModel {
    /// Mean per-sample distance delta applied to every sample.
    #[default]
    ConstantPace,
    /// Rolling mean of the actual per-sample distance delta.
    EvenEffort,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub model: SimulationModel,
    pub elapsed_s: Vec<f64>,
    pub actual_m: Vec<Option<f64>>,
    pub simulated_m: Vec<f64>,
    pub actual_total_m: f64,
    pub simulated_total_m: f64,
    pub actual_finish_s: f64,
    pub projected_finish_s: f64,
}

impl Simulation {
    /// Projected minus actual finish time; negative = faster.
    pub fn difference_s(&self) -> f64 {
        self.projected_finish_s - self.actual_finish_s
    }
}

pub fn simulate(
    derived: &DerivedSeries,
    model: SimulationModel,
    window: usize,
) -> Result<Simulation, AnalysisError> {
    derived.fields.require(Metric::Simulation, &[Column::Distance])?;
    let n = derived.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientSamples { needed: 2, got: n });
    }

    let deltas: Vec<Option<f64>> = derived.samples[1..]
        .iter()
        .map(|s| s.distance_delta_m)
        .collect();
    let mean_delta = mean_defined(deltas.iter().copied()).ok_or_else(|| {
        AnalysisError::InsufficientData("no consecutive distance readings".into())
    })?;

    let increments: Vec<f64> = match model {
        SimulationModel::ConstantPace => vec![mean_delta; n - 1],
        SimulationModel::EvenEffort => centered_mean(&deltas, window)
            .into_iter()
            .map(|d| d.unwrap_or(mean_delta))
            .collect(),
    };

    let start = derived.samples[0].distance.unwrap_or(0.0);
    let mut simulated_m = Vec::with_capacity(n);
    simulated_m.push(start);
    let mut acc = start;
    for inc in increments {
        acc += inc;
        simulated_m.push(acc);
    }

    let actual_total_m = derived
        .samples
        .iter()
        .rev()
        .find_map(|s| s.distance)
        .ok_or_else(|| AnalysisError::InsufficientData("no distance readings".into()))?;
    let simulated_total_m = acc;
    if simulated_total_m == 0.0 || !simulated_total_m.is_finite() {
        return Err(AnalysisError::DivisionUndefined(
            "simulated cumulative distance is zero".into(),
        ));
    }

    let actual_finish_s = derived.samples[n - 1].elapsed_s;
    Ok(Simulation {
        model,
        elapsed_s: derived.samples.iter().map(|s| s.elapsed_s).collect(),
        actual_m: derived.samples.iter().map(|s| s.distance).collect(),
        simulated_m,
        actual_total_m,
        simulated_total_m,
        actual_finish_s,
        projected_finish_s: actual_finish_s * (actual_total_m / simulated_total_m),
    })
}
