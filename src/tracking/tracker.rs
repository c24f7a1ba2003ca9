//! Tracker selection
//!
//! [`Tracker`] is what a composition root hands to calling code: either
//! variant behind one concrete type.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::pass_through::PassThroughService;
use super::service::TrackingService;
use crate::config::TrackerConfig;
use crate::domain::ports::{
    CallInfo, CallTracker, CorrelationId, HttpCall, ResponseStatus, TelemetrySink,
};
use crate::error::Result;

/// Tracking or pass-through, chosen at composition time.
#[derive(Debug, Clone)]
pub enum Tracker {
    Tracking(TrackingService),
    PassThrough(PassThroughService),
}

impl Tracker {
    /// A tracker reporting to `sink`.
    pub fn tracking(sink: Arc<dyn TelemetrySink>) -> Self {
        Tracker::Tracking(TrackingService::with_sink(sink))
    }

    /// A tracker that only runs work.
    pub fn pass_through() -> Self {
        Tracker::PassThrough(PassThroughService::new())
    }

    /// Build from configuration.
    ///
    /// An enabled configuration without a sink is a construction error; the
    /// sink is ignored when tracking is disabled.
    pub fn from_config(config: &TrackerConfig, sink: Option<Arc<dyn TelemetrySink>>) -> Result<Self> {
        if config.enabled {
            let service = TrackingService::new(sink)?;
            info!(sink = %config.sink, "Call tracking enabled");
            Ok(Tracker::Tracking(service))
        } else {
            info!("Call tracking disabled, using pass-through tracker");
            Ok(Tracker::pass_through())
        }
    }

    /// Returns true if calls emit telemetry.
    pub fn is_tracking(&self) -> bool {
        matches!(self, Tracker::Tracking(_))
    }
}

#[async_trait]
impl CallTracker for Tracker {
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
        match self {
            Tracker::Tracking(s) => s.track_http_call(correlation_id, call, work).await,
            Tracker::PassThrough(s) => s.track_http_call(correlation_id, call, work).await,
        }
    }

    async fn track_call<T, E, F, Fut>(&self, call: CallInfo, work: F) -> std::result::Result<T, E>
    where
        T: Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        match self {
            Tracker::Tracking(s) => s.track_call(call, work).await,
            Tracker::PassThrough(s) => s.track_call(call, work).await,
        }
    }
}
