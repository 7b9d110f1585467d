//! Utility modules for the Census API.
//!
//! - [`tracing`]: injected tracer, span macros and span recording helpers

pub mod tracing;
