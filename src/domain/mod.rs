//! Domain Layer
//!
//! # Architecture
//!
//! The domain layer is organized into:
//!
//! - **Ports** (`ports.rs`) - The sink and tracker traits plus call descriptors
//! - **Events** (`events.rs`) - Telemetry records handed to sinks
//!
//! # Usage
//!
//! ```ignore
//! use calltrack::domain::{CallInfo, CallTracker};
//!
//! async fn load<T: CallTracker>(tracker: &T) -> anyhow::Result<Profile> {
//!     let call = CallInfo::new("LoadProfile", "Internal");
//!     tracker.track_call(call, || fetch_profile()).await
//! }
//! ```

pub mod events;
pub mod ports;

pub use events::{
    DependencyRecord, EventKind, EventTags, ExceptionRecord, TelemetryEvent, TelemetryRecord,
    DURATION_METRIC,
};
pub use ports::{
    CallInfo, CallTracker, CorrelationId, HttpCall, ResponseStatus, TelemetrySink, WEB_API_KIND,
};
