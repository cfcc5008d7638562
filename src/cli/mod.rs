//! CLI module for ctxlog
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `emit` - Log a message through a context seeded from the command line
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Log one JSON line carrying a request id and a locale
//! ctxlog emit --format json --request-id req-1 --field language=en "checkout started"
//!
//! # Generate shell completions
//! ctxlog completions bash > ~/.bash_completion.d/ctxlog
//! ```

pub mod completions;
pub mod emit;

pub use completions::handle_completions;
pub use emit::handle_emit;

use crate::config::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ctxlog - structured logging with request-scoped context
#[derive(Parser, Debug)]
#[command(
    name = "ctxlog",
    version,
    about = "Structured logging with request-scoped context"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit a log entry through a request context
    Emit(EmitArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Message to log (printf-style directives are expanded against --arg)
    pub message: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "ctxlog.toml")]
    pub config: PathBuf,

    /// Request identifier (generated when omitted)
    #[arg(short, long)]
    pub request_id: Option<String>,

    /// Context field to attach, as key=value (repeatable)
    #[arg(short, long = "field", value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,

    /// Structured field to attach, as key=value; values are parsed as JSON when possible
    #[arg(short, long = "data", value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,

    /// Argument for a printf-style directive in the message (repeatable)
    #[arg(short, long = "arg")]
    pub args: Vec<String>,

    /// Label attached to the entry
    #[arg(long, env = "CTXLOG_LABEL")]
    pub label: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CTXLOG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Output format (pretty, json)
    #[arg(long)]
    pub format: Option<LogFormat>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Parse a `key=value` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}
