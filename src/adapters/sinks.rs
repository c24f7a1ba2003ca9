//! Telemetry Sink Adapters
//!
//! Implements the `TelemetrySink` port with logging, in-memory, and fan-out
//! backends.

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::events::{
    DependencyRecord, ExceptionRecord, TelemetryEvent, TelemetryRecord,
};
use crate::domain::ports::TelemetrySink;
use crate::error::Result;

/// Logging-based telemetry sink.
///
/// Writes records to the tracing/logging system as JSON.
#[derive(Debug, Clone, Default)]
pub struct LoggingTelemetrySink {
    /// Whether to log records at info level (true) or debug level (false)
    info_level: bool,
}

impl LoggingTelemetrySink {
    /// Create a new logging sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that logs at info level.
    pub fn info_level() -> Self {
        Self { info_level: true }
    }

    /// Create a sink that logs at debug level.
    pub fn debug_level() -> Self {
        Self { info_level: false }
    }

    fn log(&self, record: TelemetryRecord) -> Result<()> {
        let record_type = record.record_type();
        let operation = record.operation_name().to_string();
        let json = serde_json::to_string(&record)?;

        if self.info_level {
            info!(record_type, operation = %operation, record = %json, "Telemetry");
        } else {
            debug!(record_type, operation = %operation, record = %json, "Telemetry");
        }

        Ok(())
    }
}

impl TelemetrySink for LoggingTelemetrySink {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        self.log(event.into())
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        self.log(dependency.into())
    }

    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()> {
        self.log(exception.into())
    }
}

/// In-memory telemetry collector.
///
/// Keeps every record in arrival order for later inspection.
#[derive(Debug, Default)]
pub struct InMemoryTelemetrySink {
    records: RwLock<Vec<TelemetryRecord>>,
}

impl InMemoryTelemetrySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected records.
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.read().clone()
    }

    /// Get the count of collected records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clear all collected records.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Get events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<TelemetryEvent> {
        self.records
            .read()
            .iter()
            .filter_map(TelemetryRecord::as_event)
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Get all dependency records.
    pub fn dependencies(&self) -> Vec<DependencyRecord> {
        self.records
            .read()
            .iter()
            .filter_map(TelemetryRecord::as_dependency)
            .cloned()
            .collect()
    }

    /// Get all exception records.
    pub fn exceptions(&self) -> Vec<ExceptionRecord> {
        self.records
            .read()
            .iter()
            .filter_map(TelemetryRecord::as_exception)
            .cloned()
            .collect()
    }

    /// Get every record belonging to one operation.
    pub fn records_for(&self, operation: &str) -> Vec<TelemetryRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.operation_name() == operation)
            .cloned()
            .collect()
    }

    fn push(&self, record: TelemetryRecord) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }
}

impl TelemetrySink for InMemoryTelemetrySink {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        self.push(event.into())
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        self.push(dependency.into())
    }

    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()> {
        self.push(exception.into())
    }
}

/// Composite sink that forwards to multiple backends.
///
/// Forwarding stops at the first sink that fails.
#[derive(Default)]
pub struct CompositeTelemetrySink {
    sinks: Vec<Box<dyn TelemetrySink>>,
}

impl CompositeTelemetrySink {
    /// Create a new composite sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the composite.
    pub fn with_sink<S: TelemetrySink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for CompositeTelemetrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeTelemetrySink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl TelemetrySink for CompositeTelemetrySink {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        for sink in &self.sinks {
            sink.emit_event(event.clone())?;
        }
        Ok(())
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        for sink in &self.sinks {
            sink.emit_dependency(dependency.clone())?;
        }
        Ok(())
    }

    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()> {
        for sink in &self.sinks {
            sink.emit_exception(exception.clone())?;
        }
        Ok(())
    }
}

/// Shared sinks forward through the `Arc`.
impl<S: TelemetrySink + ?Sized> TelemetrySink for std::sync::Arc<S> {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        (**self).emit_event(event)
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        (**self).emit_dependency(dependency)
    }

    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()> {
        (**self).emit_exception(exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::EventTags;
    use std::sync::Arc;

    fn calling(op: &str) -> TelemetryEvent {
        TelemetryEvent::calling(EventTags::new(op, None))
    }

    #[test]
    fn test_logging_sink() {
        let sink = LoggingTelemetrySink::new();

        // Should not panic
        sink.emit_event(calling("op")).unwrap();
        LoggingTelemetrySink::info_level().emit_event(calling("op")).unwrap();
    }

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemoryTelemetrySink::new();

        assert!(sink.is_empty());

        sink.emit_event(calling("a")).unwrap();
        sink.emit_event(calling("b")).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events_named("[CALLING] a").len(), 1);
        assert_eq!(sink.records_for("b").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_composite_sink_fans_out() {
        let first = Arc::new(InMemoryTelemetrySink::new());
        let second = Arc::new(InMemoryTelemetrySink::new());
        let composite = CompositeTelemetrySink::new()
            .with_sink(first.clone())
            .with_sink(second.clone())
            .with_sink(LoggingTelemetrySink::debug_level());

        composite.emit_event(calling("op")).unwrap();

        assert_eq!(composite.len(), 3);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
