// Python extension: thin JSON-in/JSON-out wrapper around the engine for the
// rendering layer. Built only with `--features python`.

use log::warn;
use once_cell::sync::Lazy;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::analyze_session::analyze_session_json as analyze_json;
use crate::metrics::EngineMetrics;

// One registry per interpreter process; the engine itself stays stateless.
static METRICS: Lazy<Option<EngineMetrics>> = Lazy::new(|| match EngineMetrics::new() {
    Ok(m) => Some(m),
    Err(e) => {
        warn!("prometheus registry unavailable: {e}");
        None
    }
});

/// Analyzes one session given as a JSON array of records.
/// Returns the `{"ok": ..., "report" | "error": ...}` envelope as a string.
#[pyfunction]
#[pyo3(signature = (samples_json, cfg_json=None))]
fn analyze_session_json(
    py: Python<'_>,
    samples_json: &str,
    cfg_json: Option<&str>,
) -> PyResult<String> {
    py.allow_threads(|| analyze_json(samples_json, cfg_json, METRICS.as_ref()))
        .map_err(|e| PyValueError::new_err(format!("serialize report: {e}")))
}

/// Prometheus text exposition of the process-wide counters.
#[pyfunction]
fn metrics_text() -> PyResult<String> {
    match METRICS.as_ref() {
        Some(m) => m
            .encode_text()
            .map_err(|e| PyValueError::new_err(e.to_string())),
        None => Ok(String::new()),
    }
}

#[pymodule]
fn pacelens_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze_session_json, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
