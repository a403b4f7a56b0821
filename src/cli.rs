//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, health), and their argument structs. Every `run`
//! flag has an environment variable equivalent for container deployments.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    DEFAULT_API_SERVER_URL, DEFAULT_ENVIRONMENT, DEFAULT_MAX_BODY, DEFAULT_TIMEOUT_MS,
};

#[derive(Parser)]
#[command(
    name = "tailspin-forwarder",
    version,
    about = "API request forwarder for the Tailspin Toystore storefront",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        tailspin-forwarder run                                       Forward /api/* to localhost:5100\n  \
        tailspin-forwarder run --api-server-url http://api:5100      Point at another backend\n  \
        tailspin-forwarder health                                    Check a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the forwarder
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        tailspin-forwarder run                                  Defaults for local dev\n  \
        tailspin-forwarder run -p 8080 --pretty                 Human-readable process logs\n  \
        API_SERVER_URL=http://api:5100 NODE_ENV=production tailspin-forwarder run")]
pub struct RunArgs {
    /// Backend API origin that /api/* requests are forwarded to
    #[arg(long, env = "API_SERVER_URL", default_value = DEFAULT_API_SERVER_URL)]
    pub api_server_url: String,

    /// Deployment environment label written into request logs
    #[arg(long, env = "NODE_ENV", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 4321)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Process log level (request logs are always written)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) process log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON process log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Backend request timeout in milliseconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = DEFAULT_MAX_BODY,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:4321")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
