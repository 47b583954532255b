//! Metrics collection for ferry.
//!
//! Metric names live in [`media`] so every crate records against the same
//! identifiers. Recording goes through the `metrics` facade; without an
//! installed recorder every call is a no-op.
//!
//! ```rust,ignore
//! use ferry_metrics::{counter, media};
//!
//! counter!(media::DOWNLOADS_TOTAL, "kind" => "video").increment(1);
//! ```
//!
//! # Features
//!
//! - `prometheus`: render recorded metrics in Prometheus text format

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

pub use metrics::{counter, histogram};
