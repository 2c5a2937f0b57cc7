//! promread CLI - streams series from a Prometheus remote-read endpoint.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::ConnectionArgs;
use display::Format;

#[derive(Parser)]
#[command(name = "promread")]
#[command(about = "Stream series from a Prometheus remote-read endpoint", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream series matching a filter
    Read {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Start time (RFC 3339 or Unix milliseconds). Defaults to one hour before end.
        #[arg(short, long)]
        start: Option<String>,

        /// End time, exclusive (RFC 3339 or Unix milliseconds). Defaults to now.
        #[arg(short, long)]
        end: Option<String>,

        /// Label to filter on. Omit to read every series.
        #[arg(short, long)]
        label: Option<String>,

        /// Regular expression for the label value
        #[arg(long, requires = "label")]
        label_value: Option<String>,

        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "ndjson")]
        format: Format,

        /// Attempts before giving up
        #[arg(long, default_value = "5")]
        attempts: u32,

        /// Re-deliver series already written when a retry restarts the stream
        #[arg(long)]
        no_resume: bool,
    },

    /// Check that the remote source is healthy
    Ping {
        #[command(flatten)]
        conn: ConnectionArgs,
    },
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Read {
            conn,
            start,
            end,
            label,
            label_value,
            output,
            format,
            attempts,
            no_resume,
        } => {
            commands::read::read(
                &conn,
                start.as_deref(),
                end.as_deref(),
                label.as_deref(),
                label_value.as_deref(),
                output,
                format,
                attempts,
                !no_resume,
                cli.quiet,
            )
            .await
        }
        Commands::Ping { conn } => commands::ping::ping(&conn, cli.quiet).await,
    }
}
