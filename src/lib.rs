//! calltrack - Dependency Tracking for Async Calls
//!
//! Wraps asynchronous work (outbound HTTP calls, internal function calls,
//! fire-and-forget actions) with start/complete/error telemetry and
//! dependency timing, and hands back the work's own result or error
//! untouched.
//!
//! # Architecture
//!
//! ```text
//! Calling Code → CallTracker (Tracking | PassThrough) → TelemetrySink
//! ```
//!
//! Calling code depends on the [`CallTracker`] capability only. The
//! composition root decides whether calls are tracked ([`TrackingService`])
//! or simply executed ([`PassThroughService`]).
//!
//! # Modules
//!
//! - [`adapters`] - Telemetry sink implementations
//! - [`config`] - Tracker configuration
//! - [`domain`] - Ports, call descriptors, and telemetry records
//! - [`error`] - Error types
//! - [`tracking`] - Tracking and pass-through services
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use calltrack::{CallInfo, CallTracker, LoggingTelemetrySink, Tracker};
//!
//! let tracker = Tracker::tracking(Arc::new(LoggingTelemetrySink::info_level()));
//!
//! let rows = tracker
//!     .track_call(
//!         CallInfo::new("LoadOrders", "SQL").with_target("orders-db"),
//!         || repository.load_orders(customer_id),
//!     )
//!     .await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod tracking;

// Re-export commonly used types
pub use adapters::{
    ChannelTelemetrySink, CompositeTelemetrySink, InMemoryTelemetrySink, LoggingTelemetrySink,
    PrometheusTelemetrySink,
};
pub use config::{SinkKind, TrackerConfig};
pub use domain::{
    CallInfo, CallTracker, CorrelationId, DependencyRecord, EventKind, ExceptionRecord, HttpCall,
    ResponseStatus, TelemetryEvent, TelemetryRecord, TelemetrySink,
};
pub use error::{Error, Result};
pub use tracking::{PassThroughService, Tracker, TrackingService};
