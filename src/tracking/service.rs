//! Tracking Service
//!
//! Implements [`CallTracker`] by emitting telemetry around every call.
//!
//! All call shapes funnel into one generic core, [`TrackingService::instrument`]:
//!
//! 1. Record the start instant and emit a `[CALLING]` event
//! 2. Invoke the work once and await it
//! 3. On failure emit an exception record and an `[ERROR]` event, then return
//!    the original error
//! 4. On success emit a dependency record and a `[CALLED]` event carrying the
//!    duration, then return the original value
//!
//! Sink emission is best-effort. A sink error is logged and dropped; it never
//! replaces the outcome of the tracked work.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::events::{
    DependencyRecord, EventTags, ExceptionRecord, TelemetryEvent,
};
use crate::domain::ports::{
    CallInfo, CallTracker, CorrelationId, HttpCall, ResponseStatus, TelemetrySink,
};
use crate::error::{Error, Result};

/// How a successful return value is reported in the dependency record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallOutcome {
    result_code: Option<String>,
    success: bool,
}

impl CallOutcome {
    fn succeeded() -> Self {
        Self {
            result_code: None,
            success: true,
        }
    }

    fn from_status<R: ResponseStatus>(response: &R) -> Self {
        Self {
            result_code: Some(response.status_code().to_string()),
            success: !response.is_failure(),
        }
    }
}

/// Call tracker that reports every call to a [`TelemetrySink`].
#[derive(Clone)]
pub struct TrackingService {
    sink: Arc<dyn TelemetrySink>,
}

impl TrackingService {
    /// Create a tracking service.
    ///
    /// Fails with [`Error::MissingSink`] when no sink is supplied; there is no
    /// silent fallback to pass-through behaviour.
    pub fn new(sink: Option<Arc<dyn TelemetrySink>>) -> Result<Self> {
        sink.map(Self::with_sink).ok_or(Error::MissingSink)
    }

    /// Create a tracking service around a sink.
    pub fn with_sink(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Get the sink records are sent to.
    pub fn sink(&self) -> &Arc<dyn TelemetrySink> {
        &self.sink
    }

    async fn instrument<T, E, F, Fut, C>(
        &self,
        call: CallInfo,
        work: F,
        classify: C,
    ) -> std::result::Result<T, E>
    where
        E: Display + Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        C: FnOnce(&T) -> CallOutcome,
    {
        let tags = EventTags::new(call.name.as_str(), call.correlation_id.as_ref());
        let timestamp = Utc::now();
        let started = Instant::now();

        debug!(operation = %call.name, kind = %call.kind, "Tracked call starting");
        self.report(
            "calling event",
            &call.name,
            self.sink.emit_event(TelemetryEvent::calling(tags.clone())),
        );

        match work().await {
            Err(error) => {
                debug!(operation = %call.name, error = %error, "Tracked call failed");
                self.report(
                    "exception",
                    &call.name,
                    self.sink.emit_exception(ExceptionRecord::capture(&tags, &error)),
                );
                self.report(
                    "error event",
                    &call.name,
                    self.sink.emit_event(TelemetryEvent::error(tags)),
                );
                Err(error)
            }
            Ok(value) => {
                let duration = started.elapsed();
                let outcome = classify(&value);

                debug!(
                    operation = %call.name,
                    duration_ms = duration.as_millis() as u64,
                    success = outcome.success,
                    "Tracked call completed"
                );

                let dependency = DependencyRecord {
                    name: call.name.clone(),
                    kind: call.kind,
                    target: call.target,
                    data: call.data,
                    timestamp,
                    duration,
                    result_code: outcome.result_code,
                    success: outcome.success,
                };
                self.report(
                    "dependency",
                    &call.name,
                    self.sink.emit_dependency(dependency),
                );
                self.report(
                    "called event",
                    &call.name,
                    self.sink.emit_event(TelemetryEvent::called(tags, duration)),
                );
                Ok(value)
            }
        }
    }

    fn report(&self, record: &'static str, operation: &str, result: Result<()>) {
        if let Err(e) = result {
            warn!(
                record,
                operation = %operation,
                error = %e,
                "Telemetry sink rejected record"
            );
        }
    }
}

impl std::fmt::Debug for TrackingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingService").finish_non_exhaustive()
    }
}

#[async_trait]
impl CallTracker for TrackingService {
    async fn track_http_call<R, E, F, Fut>(
        &self,
        correlation_id: Option<CorrelationId>,
        call: HttpCall,
        work: F,
    ) -> std::result::Result<R, E>
    where
        R: ResponseStatus + Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<R, E>> + Send,
    {
        let info = call.to_call_info(correlation_id);
        self.instrument(info, work, CallOutcome::from_status).await
    }

    async fn track_call<T, E, F, Fut>(&self, call: CallInfo, work: F) -> std::result::Result<T, E>
    where
        T: Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        self.instrument(call, work, |_| CallOutcome::succeeded()).await
    }
}

// =============================================================================
// Tests
// =============================================================================
