//! Telemetry Records
//!
//! Immutable records emitted by a tracking service. Each record is built for
//! one tracked call, handed to the sink once, and then dropped.
//!
//! # Ordering
//!
//! A successful call produces:
//!
//! ```text
//! Event(Calling) → Dependency → Event(Called)
//! ```
//!
//! A failed call produces:
//!
//! ```text
//! Event(Calling) → Exception → Event(Error)
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ports::CorrelationId;

/// Metric key carried by completion events, in milliseconds.
pub const DURATION_METRIC: &str = "Duration";

// =============================================================================
// Events
// =============================================================================

/// Lifecycle marker of a tracked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Work is about to be invoked
    Calling,
    /// Work completed successfully
    Called,
    /// Work failed
    Error,
}

impl EventKind {
    /// Bracketed prefix used in event names.
    pub fn marker(&self) -> &'static str {
        match self {
            EventKind::Calling => "[CALLING]",
            EventKind::Called => "[CALLED]",
            EventKind::Error => "[ERROR]",
        }
    }

    /// Lowercase label, used for metric labels and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Calling => "calling",
            EventKind::Called => "called",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tags attached to every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTags {
    pub operation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl EventTags {
    /// Build tags for an operation. Blank correlation tokens are dropped.
    pub fn new(operation_name: impl Into<String>, correlation_id: Option<&CorrelationId>) -> Self {
        Self {
            operation_name: operation_name.into(),
            correlation_id: correlation_id
                .filter(|id| !id.is_blank())
                .map(|id| id.as_str().to_string()),
        }
    }
}

/// A named event with tags and optional numeric measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub name: String,
    pub kind: EventKind,
    pub tags: EventTags,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Create an event for `kind` named `"{marker} {operation}"`.
    pub fn new(kind: EventKind, tags: EventTags) -> Self {
        Self {
            name: format!("{} {}", kind.marker(), tags.operation_name),
            kind,
            tags,
            metrics: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Start marker.
    pub fn calling(tags: EventTags) -> Self {
        Self::new(EventKind::Calling, tags)
    }

    /// Completion marker carrying the call duration.
    pub fn called(tags: EventTags, duration: Duration) -> Self {
        Self::new(EventKind::Called, tags).with_metric(DURATION_METRIC, duration_ms(duration))
    }

    /// Failure marker.
    pub fn error(tags: EventTags) -> Self {
        Self::new(EventKind::Error, tags)
    }

    /// Attach a metric.
    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    /// Duration in milliseconds, if this is a completion event.
    pub fn duration_ms(&self) -> Option<f64> {
        self.metrics.get(DURATION_METRIC).copied()
    }
}

// =============================================================================
// Dependencies
// =============================================================================

/// Outcome of one outbound or internal call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub kind: String,
    pub target: Option<String>,
    pub data: Option<String>,
    /// When the call started
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
    pub success: bool,
}

impl DependencyRecord {
    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        duration_ms(self.duration)
    }
}

// =============================================================================
// Exceptions
// =============================================================================

/// Failure detail captured from wrapped work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub operation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// `Display` rendering of the error
    pub message: String,
    /// `Debug` rendering of the error, including any cause chain it prints
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl ExceptionRecord {
    /// Capture an error raised by the operation described by `tags`.
    pub fn capture<E>(tags: &EventTags, error: &E) -> Self
    where
        E: std::fmt::Display + std::fmt::Debug + ?Sized,
    {
        Self {
            operation_name: tags.operation_name.clone(),
            correlation_id: tags.correlation_id.clone(),
            message: error.to_string(),
            detail: format!("{:?}", error),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Any record a sink can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryRecord {
    Event(TelemetryEvent),
    Dependency(DependencyRecord),
    Exception(ExceptionRecord),
}

impl TelemetryRecord {
    /// Get the record type name.
    pub fn record_type(&self) -> &'static str {
        match self {
            TelemetryRecord::Event(_) => "Event",
            TelemetryRecord::Dependency(_) => "Dependency",
            TelemetryRecord::Exception(_) => "Exception",
        }
    }

    /// Operation this record belongs to.
    pub fn operation_name(&self) -> &str {
        match self {
            TelemetryRecord::Event(e) => &e.tags.operation_name,
            TelemetryRecord::Dependency(d) => &d.name,
            TelemetryRecord::Exception(x) => &x.operation_name,
        }
    }

    pub fn as_event(&self) -> Option<&TelemetryEvent> {
        match self {
            TelemetryRecord::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_dependency(&self) -> Option<&DependencyRecord> {
        match self {
            TelemetryRecord::Dependency(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_exception(&self) -> Option<&ExceptionRecord> {
        match self {
            TelemetryRecord::Exception(x) => Some(x),
            _ => None,
        }
    }
}

impl From<TelemetryEvent> for TelemetryRecord {
    fn from(event: TelemetryEvent) -> Self {
        TelemetryRecord::Event(event)
    }
}

impl From<DependencyRecord> for TelemetryRecord {
    fn from(dependency: DependencyRecord) -> Self {
        TelemetryRecord::Dependency(dependency)
    }
}

impl From<ExceptionRecord> for TelemetryRecord {
    fn from(exception: ExceptionRecord) -> Self {
        TelemetryRecord::Exception(exception)
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let tags = EventTags::new("GET /api/x", None);

        assert_eq!(TelemetryEvent::calling(tags.clone()).name, "[CALLING] GET /api/x");
        assert_eq!(TelemetryEvent::error(tags.clone()).name, "[ERROR] GET /api/x");
        assert_eq!(
            TelemetryEvent::called(tags, Duration::from_millis(5)).name,
            "[CALLED] GET /api/x"
        );
    }

    #[test]
    fn test_completion_event_carries_duration() {
        let tags = EventTags::new("DoThing", None);
        let event = TelemetryEvent::called(tags, Duration::from_millis(1500));

        assert_eq!(event.duration_ms(), Some(1500.0));
        assert_eq!(TelemetryEvent::calling(EventTags::new("x", None)).duration_ms(), None);
    }

    #[test]
    fn test_blank_correlation_id_dropped() {
        let blank = CorrelationId::new("   ");
        assert_eq!(EventTags::new("op", Some(&blank)).correlation_id, None);

        let id = CorrelationId::new("chain-7");
        assert_eq!(
            EventTags::new("op", Some(&id)).correlation_id.as_deref(),
            Some("chain-7")
        );
    }

    #[test]
    fn test_exception_capture_uses_display_and_debug() {
        let tags = EventTags::new("DoThing", Some(&CorrelationId::new("c1")));
        let err = anyhow::anyhow!("root cause").context("boom");

        let record = ExceptionRecord::capture(&tags, &err);

        assert_eq!(record.message, "boom");
        assert!(record.detail.contains("root cause"));
        assert_eq!(record.correlation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_record_serializes_with_type_tag() {
        let record = TelemetryRecord::from(TelemetryEvent::calling(EventTags::new("op", None)));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "Event");
        assert_eq!(json["name"], "[CALLING] op");
        assert_eq!(record.record_type(), "Event");
        assert_eq!(record.operation_name(), "op");
    }
}
