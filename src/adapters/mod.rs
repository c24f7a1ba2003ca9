//! Telemetry Sink Adapters
//!
//! This module contains adapter implementations of the
//! [`TelemetrySink`](crate::domain::ports::TelemetrySink) port.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     TrackingService                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ TelemetrySink
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │ LoggingTelemetrySink │ InMemoryTelemetrySink               │ │
//! │  │ CompositeTelemetrySink │ ChannelTelemetrySink              │ │
//! │  │ PrometheusTelemetrySink                                    │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use calltrack::adapters::{CompositeTelemetrySink, LoggingTelemetrySink, PrometheusTelemetrySink};
//! use calltrack::tracking::Tracker;
//!
//! let metrics = PrometheusTelemetrySink::new()?;
//! let sink = CompositeTelemetrySink::new()
//!     .with_sink(LoggingTelemetrySink::info_level())
//!     .with_sink(metrics.clone());
//!
//! let tracker = Tracker::tracking(Arc::new(sink));
//! ```

mod channel;
mod prometheus;
mod sinks;

pub use channel::{spawn_forwarder, ChannelTelemetrySink, DEFAULT_CHANNEL_CAPACITY};
pub use prometheus::PrometheusTelemetrySink;
pub use sinks::{CompositeTelemetrySink, InMemoryTelemetrySink, LoggingTelemetrySink};
