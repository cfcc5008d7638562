//! Emit command implementation

use crate::cli::EmitArgs;
use crate::config::CtxlogConfig;
use crate::context::Context;
use crate::logging::{generate_request_id, init_tracing, Logger};
use serde_json::{Map, Value};
use std::fmt;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &EmitArgs,
) -> Result<CtxlogConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        CtxlogConfig::load(Some(&args.config))?
    } else {
        CtxlogConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(ref label) = args.label {
        config.logging.label = label.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(format) = args.format {
        config.logging.format = format;
    }

    Ok(config)
}

/// Build the context the entry is emitted with
pub fn build_context(logger: &Logger, args: &EmitArgs) -> Context {
    let request_id = args
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);

    let ctx = logger.build_context_data_and_set_value(request_id.as_str());
    if args.fields.is_empty() {
        return ctx;
    }
    logger.set_context_data_and_set_value(ctx, args.fields.iter().cloned(), request_id)
}

/// Structured fields from `--data`, JSON-typed where the value parses as JSON
pub fn structured_fields(args: &EmitArgs) -> Map<String, Value> {
    args.data
        .iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
            (key.clone(), value)
        })
        .collect()
}

/// Handle `ctxlog emit` command
pub fn handle_emit(args: &EmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(args)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let logger = Logger::new(config.logging.label.as_str());
    let ctx = build_context(&logger, args);
    let message_args: Vec<&dyn fmt::Display> =
        args.args.iter().map(|a| a as &dyn fmt::Display).collect();

    if args.data.is_empty() {
        logger.infof(&ctx, &args.message, &message_args);
    } else {
        let message = crate::logging::sprintf(&args.message, &message_args);
        logger.info_map(&ctx, &structured_fields(args), message);
    }

    Ok(())
}
