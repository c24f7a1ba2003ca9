//! Domain Ports (Port/Adapter Pattern)
//!
//! This module defines the two seams of the crate:
//!
//! - [`TelemetrySink`] - where tracking services send their records
//! - [`CallTracker`] - the capability calling code depends on
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Calling Code                           │
//! │              (HTTP clients, internal services)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ CallTracker
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Tracking Layer                        │
//! │       TrackingService │ PassThroughService │ Tracker        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ TelemetrySink
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Sink Adapters                         │
//! │   Logging │ InMemory │ Composite │ Channel │ Prometheus     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::{Debug, Display};
use std::future::Future;

use async_trait::async_trait;
use reqwest::Url;

use super::events::{DependencyRecord, ExceptionRecord, TelemetryEvent};
use crate::error::{Error, Result};

/// Dependency type recorded for HTTP calls.
pub const WEB_API_KIND: &str = "WebAPI";

// =============================================================================
// Value Objects
// =============================================================================

/// Caller-supplied token linking several tracked calls into one chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank tokens are never attached to telemetry.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Description of one tracked invocation.
///
/// `target` and `data` are free-form and absent unless set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub correlation_id: Option<CorrelationId>,
    pub name: String,
    pub kind: String,
    pub target: Option<String>,
    pub data: Option<String>,
}

impl CallInfo {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            correlation_id: None,
            name: name.into(),
            kind: kind.into(),
            target: None,
            data: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// A validated outbound HTTP call.
///
/// Construction is the only place HTTP arguments are checked, so a rejected
/// call never reaches a tracker and never produces telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCall {
    method: String,
    url: Url,
}

impl HttpCall {
    /// Build from a method and an already parsed URL.
    pub fn new(method: &str, url: Url) -> Result<Self> {
        if method.trim().is_empty() {
            return Err(Error::invalid_argument("method", "must not be blank"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(Error::invalid_argument(
                "uri",
                format!("'{}' has no host", url),
            ));
        }

        Ok(Self {
            method: method.trim().to_ascii_uppercase(),
            url,
        })
    }

    /// Build from a method and a URI string.
    pub fn parse(method: &str, uri: &str) -> Result<Self> {
        if method.trim().is_empty() {
            return Err(Error::invalid_argument("method", "must not be blank"));
        }
        if uri.trim().is_empty() {
            return Err(Error::invalid_argument("uri", "must not be blank"));
        }

        let url = Url::parse(uri.trim()).map_err(|e| Error::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        Self::new(method, url)
    }

    /// Uppercased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Operation name, `"{METHOD} {path}"`.
    pub fn operation_name(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }

    /// Describe this request as a `WebAPI` dependency on the URL host.
    pub fn to_call_info(&self, correlation_id: Option<CorrelationId>) -> CallInfo {
        CallInfo {
            correlation_id,
            name: self.operation_name(),
            kind: WEB_API_KIND.to_string(),
            target: self.url.host_str().map(str::to_string),
            data: self.url.query().map(str::to_string),
        }
    }
}

impl TryFrom<&reqwest::Request> for HttpCall {
    type Error = Error;

    fn try_from(request: &reqwest::Request) -> Result<Self> {
        Self::new(request.method().as_str(), request.url().clone())
    }
}

/// Anything an HTTP call can return that carries a status code.
pub trait ResponseStatus {
    fn status_code(&self) -> u16;

    /// 4xx and 5xx responses are recorded as unsuccessful dependencies.
    fn is_failure(&self) -> bool {
        self.status_code() >= 400
    }
}

impl ResponseStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl ResponseStatus for reqwest::StatusCode {
    fn status_code(&self) -> u16 {
        self.as_u16()
    }
}

// =============================================================================
// Telemetry Sink Port
// =============================================================================

/// Port for the telemetry backend.
///
/// Implementations must be safe to share between concurrent tracked calls;
/// trackers never lock around them. Emission is a hand-off: implementations
/// should not block on delivery.
pub trait TelemetrySink: Send + Sync {
    /// Emit a lifecycle event.
    fn emit_event(&self, event: TelemetryEvent) -> Result<()>;

    /// Emit a dependency record for a completed call.
    fn emit_dependency(&self, dependency: DependencyRecord) -> Result<()>;

    /// Emit failure detail for a call whose work failed.
    fn emit_exception(&self, exception: ExceptionRecord) -> Result<()>;
}

// =============================================================================
// Call Tracker Port
// =============================================================================

/// Capability to run deferred work under instrumentation.
///
/// Work is a zero-argument closure producing a future. Trackers invoke it
/// exactly once and return its outcome unchanged: the same value on success,
/// the same error value on failure. Nothing is retried or memoized.
///
/// # Example
///
/// ```ignore
/// let call = CallInfo::new("LoadProfile", "Internal").with_target("profile-store");
/// let profile = tracker.track_call(call, || store.load(user_id)).await?;
/// ```
#[async_trait]
pub trait CallTracker: Send + Sync {
    /// Track an outbound HTTP call.
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
        Fut: Future<Output = std::result::Result<R, E>> + Send;

    /// Track any call producing a value.
    async fn track_call<T, E, F, Fut>(&self, call: CallInfo, work: F) -> std::result::Result<T, E>
    where
        T: Send,
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send;

    /// Track a call producing no value.
    async fn track_action<E, F, Fut>(&self, call: CallInfo, work: F) -> std::result::Result<(), E>
    where
        E: Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<(), E>> + Send,
    {
        self.track_call(call, work).await
    }

    /// Validate a raw method and URI, then track the call.
    ///
    /// A rejected method or URI is returned as `E` before any telemetry is
    /// emitted and before `work` is invoked.
    async fn track_request<R, E, F, Fut>(
        &self,
        correlation_id: Option<CorrelationId>,
        method: &str,
        uri: &str,
        work: F,
    ) -> std::result::Result<R, E>
    where
        R: ResponseStatus + Send,
        E: From<Error> + Display + Debug + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = std::result::Result<R, E>> + Send,
    {
        let call = HttpCall::parse(method, uri)?;
        self.track_http_call(correlation_id, call, work).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_http_call_describes_web_api_dependency() {
        let call = HttpCall::parse("get", "http://svc/api/x?y=1").unwrap();
        let info = call.to_call_info(Some(CorrelationId::new("c-1")));

        assert_eq!(info.name, "GET /api/x");
        assert_eq!(info.kind, "WebAPI");
        assert_eq!(info.target.as_deref(), Some("svc"));
        assert_eq!(info.data.as_deref(), Some("y=1"));
        assert_eq!(info.correlation_id, Some(CorrelationId::new("c-1")));
    }

    #[test]
    fn test_http_call_without_query_has_no_data() {
        let info = HttpCall::parse("POST", "https://api.example.com/orders")
            .unwrap()
            .to_call_info(None);

        assert_eq!(info.name, "POST /orders");
        assert_eq!(info.data, None);
    }

    #[test]
    fn test_http_call_rejects_blank_method() {
        assert_matches!(
            HttpCall::parse("   ", "http://svc/x"),
            Err(Error::InvalidArgument { name: "method", .. })
        );
    }

    #[test]
    fn test_http_call_rejects_blank_uri() {
        assert_matches!(
            HttpCall::parse("GET", " \t"),
            Err(Error::InvalidArgument { name: "uri", .. })
        );
    }

    #[test]
    fn test_http_call_rejects_unparsable_uri() {
        let err = HttpCall::parse("GET", "not a uri").unwrap_err();
        assert_matches!(err, Error::InvalidUri { .. });
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_http_call_rejects_uri_without_host() {
        let url = Url::parse("file:///etc/hosts").unwrap();
        assert_matches!(
            HttpCall::new("GET", url),
            Err(Error::InvalidArgument { name: "uri", .. })
        );
    }

    #[test]
    fn test_http_call_from_request() {
        let request = reqwest::Request::new(
            reqwest::Method::DELETE,
            Url::parse("http://svc/items/9").unwrap(),
        );
        let call = HttpCall::try_from(&request).unwrap();

        assert_eq!(call.method(), "DELETE");
        assert_eq!(call.operation_name(), "DELETE /items/9");
    }

    #[test]
    fn test_call_info_defaults() {
        let info = CallInfo::new("DoThing", "Internal");

        assert_eq!(info.target, None);
        assert_eq!(info.data, None);
        assert_eq!(info.correlation_id, None);
    }

    #[test]
    fn test_status_failure_classification() {
        assert!(!reqwest::StatusCode::OK.is_failure());
        assert!(!reqwest::StatusCode::FOUND.is_failure());
        assert!(reqwest::StatusCode::NOT_FOUND.is_failure());
        assert!(reqwest::StatusCode::BAD_GATEWAY.is_failure());
    }

    #[test]
    fn test_correlation_id_generate_is_unique() {
        let a = CorrelationId::generate();
        let b = CorrelationId::generate();

        assert_ne!(a, b);
        assert!(!a.is_blank());
    }
}
