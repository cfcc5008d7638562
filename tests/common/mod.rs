//! Shared test utilities for ctxlog integration tests.
//!
//! Provides loggers wired to an in-memory sink and sample fixtures mirroring
//! the values a request handler would attach.

#![allow(dead_code)]

use ctxlog::logging::{Logger, MemorySink};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Label used by every test logger
pub const TEST_LABEL: &str = "some string with a somewhat realistic length";

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

// =============================================================================
// Builders
// =============================================================================

/// Create a logger recording into a fresh in-memory sink.
pub fn memory_logger() -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Logger::with_sink(TEST_LABEL, sink.clone()), sink)
}

/// Extra context fields a handler derives from an inbound request.
pub fn request_extra_data(method: &str) -> HashMap<String, String> {
    let mut data = HashMap::new();
    data.insert("http_method".to_string(), method.to_string());
    data.insert("language".to_string(), "language_code".to_string());
    data
}
