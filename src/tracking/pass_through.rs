//! Pass-Through Service
//!
//! [`CallTracker`] that does nothing but run the work. Selected when
//! telemetry is disabled so call sites stay unchanged.

use std::fmt::{Debug, Display};
use std::future::Future;

use async_trait::async_trait;

use crate::domain::ports::{CallInfo, CallTracker, CorrelationId, HttpCall, ResponseStatus};

/// Call tracker that emits nothing and measures nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughService;

impl PassThroughService {
    /// Create a pass-through service.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CallTracker for PassThroughService {
    async fn track_http_call<R, E, F, Fut>(
        &self,
        _correlation_id: Option<CorrelationId>,
        _call: HttpCall,
        work: F,
    ) -> std::result::Result<R, E>
    where
        R: ResponseStatus + Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<R, E>> + Send,
    {
        work().await
    }

    async fn track_call<T, E, F, Fut>(&self, _call: CallInfo, work: F) -> std::result::Result<T, E>
    where
        T: Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        work().await
    }
}
