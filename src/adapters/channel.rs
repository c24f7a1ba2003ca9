//! Channel Sink Adapter
//!
//! Hands records to a bounded tokio channel without waiting. A background
//! task (see [`spawn_forwarder`]) drains the channel into a slower sink, so a
//! tracked call never waits on telemetry delivery.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::events::{
    DependencyRecord, ExceptionRecord, TelemetryEvent, TelemetryRecord,
};
use crate::domain::ports::TelemetrySink;
use crate::error::{Error, Result};

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Sink that enqueues records onto a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTelemetrySink {
    sender: mpsc::Sender<TelemetryRecord>,
}

impl ChannelTelemetrySink {
    /// Create a sink and the receiver that drains it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TelemetryRecord>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Create a sink with the default capacity.
    pub fn with_default_capacity() -> (Self, mpsc::Receiver<TelemetryRecord>) {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    fn send(&self, record: TelemetryRecord) -> Result<()> {
        self.sender.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(record) => Error::SinkUnavailable(format!(
                "channel full, dropped {} record",
                record.record_type()
            )),
            mpsc::error::TrySendError::Closed(_) => {
                Error::SinkUnavailable("channel closed".to_string())
            }
        })
    }
}

impl TelemetrySink for ChannelTelemetrySink {
    fn emit_event(&self, event: TelemetryEvent) -> Result<()> {
        self.send(event.into())
    }

    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()> {
        self.send(dependency.into())
    }

    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()> {
        self.send(exception.into())
    }
}

/// Drain `receiver` into `sink` until every sender is dropped.
///
/// Returns the number of records forwarded. Records the downstream sink
/// rejects are logged and skipped.
pub fn spawn_forwarder(
    mut receiver: mpsc::Receiver<TelemetryRecord>,
    sink: Arc<dyn TelemetrySink>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut forwarded = 0u64;

        while let Some(record) = receiver.recv().await {
            let record_type = record.record_type();
            let result = match record {
                TelemetryRecord::Event(e) => sink.emit_event(e),
                TelemetryRecord::Dependency(d) => sink.emit_dependency(d),
                TelemetryRecord::Exception(x) => sink.emit_exception(x),
            };

            match result {
                Ok(()) => forwarded += 1,
                Err(e) => warn!(record_type, error = %e, "Forwarding telemetry failed"),
            }
        }

        debug!(forwarded, "Telemetry forwarder stopped");
        forwarded
    })
}
