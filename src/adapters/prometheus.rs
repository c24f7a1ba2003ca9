//! Prometheus Sink Adapter
//!
//! Implements the `TelemetrySink` port by aggregating records into
//! Prometheus counters and histograms.
//!
//! Operation names are never used as label values. HTTP operation names
//! carry the request path, so labelling by them would grow one series per
//! distinct URL. Labels are limited to the event kind, the dependency kind,
//! and the outcome.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::domain::events::{DependencyRecord, ExceptionRecord, TelemetryEvent};
use crate::domain::ports::TelemetrySink;
use crate::error::Result;

/// Histogram buckets for dependency durations, in seconds.
const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Prometheus-backed telemetry sink.
///
/// Owns its registry so several sinks (or tests) never collide on metric
/// names in the process-wide default registry.
#[derive(Clone)]
pub struct PrometheusTelemetrySink {
    registry: Registry,
    events: IntCounterVec,
    dependency_duration: HistogramVec,
    exceptions: IntCounter,
}

impl PrometheusTelemetrySink {
    /// Create a sink with a fresh registry.
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create a sink that registers its metrics in `registry`.
    pub fn with_registry(registry: Registry) -> Result<Self> {
        let events = IntCounterVec::new(
            Opts::new("calltrack_events_total", "Tracked call lifecycle events"),
            &["event"],
        )?;
        let dependency_duration = HistogramVec::new(
            HistogramOpts::new(
                "calltrack_dependency_duration_seconds",
                "Duration of completed tracked calls",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["kind", "success"],
        )?;
        let exceptions = IntCounter::with_opts(Opts::new(
            "calltrack_exceptions_total",
            "Failures raised by tracked work",
        ))?;

        registry.register(Box::new(events.clone()))?;
        registry.register(Box::new(dependency_duration.clone()))?;
        registry.register(Box::new(exceptions.clone()))?;

        Ok(Self {
            registry,
            events,
            dependency_duration,
            exceptions,
        })
    }

    /// Get the registry backing this sink.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the text exposition format.
    pub fn gather_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Count of events of `event` kind (`calling`, `called`, `error`).
    pub fn event_count(&self, event: &str) -> u64 {
        self.events.with_label_values(&[event]).get()
    }

    /// Count of dependencies observed for a kind/outcome.
    pub fn dependency_count(&self, kind: &str, success: bool) -> u64 {
        self.dependency_duration
            .with_label_values(&[kind, success_label(success)])
            .get_sample_count()
    }

    /// Count of failures recorded.
    pub fn exception_count(&self) -> u64 {
        self.exceptions.get()
    }
}

impl std::fmt::Debug for PrometheusTelemetrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusTelemetrySink").finish_non_exhaustive()
    }
}

impl TelemetrySink for PrometheusTelemetrySink {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        self.events
            .with_label_values(&[event.kind.as_str()])
            .inc();
        Ok(())
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        self.dependency_duration
            .with_label_values(&[dependency.kind.as_str(), success_label(dependency.success)])
            .observe(dependency.duration.as_secs_f64());
        Ok(())
    }

    fn emit_exception(&self, _exception: ExceptionRecord) -> Result<()> {
        self.exceptions.inc();
        Ok(())
    }
}

fn success_label(success: bool) -> &'static str {
    if success {
        "true"
    } else {
        "false"
    }
}
