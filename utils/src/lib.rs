//! Shared utilities for the pledge service.

pub mod logging;

pub use logging::init_tracing;
