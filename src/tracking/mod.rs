//! Call Tracking
//!
//! Implementations of the [`CallTracker`](crate::domain::ports::CallTracker)
//! capability:
//!
//! - [`TrackingService`] - emits start/complete/error telemetry and dependency timing
//! - [`PassThroughService`] - runs work with no telemetry
//! - [`Tracker`] - either of the above, selected from configuration

mod pass_through;
mod service;
mod tracker;

pub use pass_through::PassThroughService;
pub use service::TrackingService;
pub use tracker::Tracker;
