//! Command-line flags for the `chatrelay` binary.
//!
//! Every flag is optional: with none, configuration is loaded from the
//! default locations and the server listens on `0.0.0.0:5500`.

use std::path::PathBuf;

use clap::Parser;

/// Relay WhatsApp conversations to Gemini or Ollama.
#[derive(Debug, Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ~/.chatrelay/config.toml).
    #[arg(long, env = "CHATRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind, overriding `[server] host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding `[server] port`.
    #[arg(long)]
    pub port: Option<u16>,

    /// Detailed output (-v for debug, -vv for trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,
}
