//! CLI entry point for reasonflow.

pub mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// reasonflow CLI
#[derive(Parser, Debug)]
#[command(
    name = "reasonflow",
    version,
    about = "Streaming answer reconciliation for LLM fragment streams"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded upstream stream and print the reconciled SSE output
    Replay(ReplayArgs),
}

/// Format of a recording.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// One fragment JSON object per line
    Jsonl,
    /// Raw OpenAI-compatible `text/event-stream` body
    Sse,
}

/// Arguments for `reasonflow replay`.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Recording to replay
    pub file: PathBuf,

    /// Recording format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: InputFormat,

    /// TOML config file (environment variables still take precedence)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Suppress reasoning deltas
    #[arg(long)]
    pub no_reasoning: bool,

    /// Model name stamped on deltas
    #[arg(short, long)]
    pub model: Option<String>,

    /// Seconds to wait for the first fragment
    #[arg(long)]
    pub initial_timeout: Option<f64>,

    /// Seconds allowed between fragments
    #[arg(long)]
    pub gap_timeout: Option<f64>,

    /// Delay between replayed fragments, in milliseconds
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,
}
