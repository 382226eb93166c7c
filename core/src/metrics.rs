use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::types::SessionReport;

/// Prometheus counters for the analysis pipeline.
///
/// Owned by the caller and passed explicitly; the engine itself keeps no
/// process-wide state.
pub struct EngineMetrics {
    registry: Registry,
    sessions_total: IntCounter,
    sessions_failed_total: IntCounter,
    samples_total: IntCounter,
    aggregates_skipped_total: IntCounterVec,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let sessions_total = IntCounter::with_opts(Opts::new(
            "pacelens_sessions_total",
            "Sessions analyzed successfully",
        ))?;
        let sessions_failed_total = IntCounter::with_opts(Opts::new(
            "pacelens_sessions_failed_total",
            "Sessions aborted by a terminal error",
        ))?;
        let samples_total = IntCounter::with_opts(Opts::new(
            "pacelens_samples_total",
            "Samples ingested across all analyzed sessions",
        ))?;
        let aggregates_skipped_total = IntCounterVec::new(
            Opts::new(
                "pacelens_aggregates_skipped_total",
                "Aggregates skipped for missing or insufficient data",
            ),
            &["aggregate"],
        )?;

        registry.register(Box::new(sessions_total.clone()))?;
        registry.register(Box::new(sessions_failed_total.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(aggregates_skipped_total.clone()))?;

        Ok(Self {
            registry,
            sessions_total,
            sessions_failed_total,
            samples_total,
            aggregates_skipped_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_session(&self, report: &SessionReport) {
        self.sessions_total.inc();
        self.samples_total.inc_by(report.sample_count as u64);
        for (name, _) in report.skipped() {
            self.aggregates_skipped_total.with_label_values(&[name]).inc();
        }
    }

    pub fn record_failure(&self) {
        self.sessions_failed_total.inc();
    }

    pub fn sessions_total(&self) -> u64 {
        self.sessions_total.get()
    }

    pub fn sessions_failed_total(&self) -> u64 {
        self.sessions_failed_total.get()
    }

    pub fn skipped_total(&self, aggregate: &str) -> u64 {
        self.aggregates_skipped_total
            .with_label_values(&[aggregate])
            .get()
    }

    /// Text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
