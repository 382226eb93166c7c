use serde::Serialize;
use thiserror::Error;

use crate::types::{Column, Metric};

/// Structured analysis failures.
///
/// Only `MissingTimeField`, `InvalidTimestamp`, `InvalidParameter` and `Input`
/// abort a session. Everything else is local to one metric or one aggregate and
/// ends up as an `Outcome::Skipped` in the report.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnalysisError {
    #[error("no `timestamp` or `time` column found")]
    MissingTimeField,

    #[error("unparseable timestamp at row {row}: {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("metric `{metric}` unavailable: needs `{requires}` data")]
    MetricUnavailable { metric: Metric, requires: Column },

    #[error("insufficient samples: need {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("division undefined: {0}")]
    DivisionUndefined(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid input: {0}")]
    Input(String),
}

impl AnalysisError {
    pub fn unavailable(metric: Metric, requires: Column) -> Self {
        AnalysisError::MetricUnavailable { metric, requires }
    }

    /// True for conditions that abort the whole session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingTimeField
                | AnalysisError::InvalidTimestamp { .. }
                | AnalysisError::InvalidParameter(_)
                | AnalysisError::Input(_)
        )
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for AnalysisError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        AnalysisError::Input(format!("{} at `{}`", err.inner(), err.path()))
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::Input(format!("csv: {err}"))
    }
}
