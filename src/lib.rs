//! ctxlog - structured logging with request-scoped context
//!
//! This library carries logging metadata (request identifiers, inbound HTTP
//! attributes, arbitrary key/value pairs) inside immutable contexts, so code
//! deep in a call chain logs with the metadata gathered by the layers above it
//! without passing it around explicitly.
//!
//! # Example
//!
//! ```
//! use ctxlog::logging::Logger;
//!
//! let logger = Logger::new("orders-api");
//! let ctx = logger.build_context_data_and_set_value("req-42");
//! let ctx = logger.set_context_data_and_set_value(ctx, [("language", "en")], "req-42");
//!
//! logger.info(&ctx, "order accepted");
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod logging;
