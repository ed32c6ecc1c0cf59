//! Observability setup for Platewire: tracing subscriber initialization
//! with optional OpenTelemetry trace export.

pub mod tracing_setup;
