//! gcp - Guarded Copy
//!
//! Copy or move a single file without leaving half-written output behind,
//! powered by guardcopy.

use clap::{Parser, ValueEnum};
use guardcopy::{
    Error as GuardcopyError, ErrorCode, TransferEngine, TransferOptions, TransferOutcome,
    TransferRequest,
};
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// gcp - Cancellation-safe file copy
///
/// Copies (or with -m, moves) SOURCE to DEST. If the copy is interrupted by
/// Ctrl-C or fails, the partial DEST is removed before gcp exits.
///
/// Usage:
///   gcp SOURCE DEST
///   gcp -m SOURCE DEST
#[derive(Parser, Debug)]
#[command(name = "gcp", version, about, long_about = None)]
struct Args {
    /// Source file
    source: PathBuf,

    /// Destination file
    dest: PathBuf,

    /// Move instead of copy (remove SOURCE after a successful copy)
    #[arg(short = 'm', long = "move")]
    move_source: bool,

    /// Replace DEST if it already exists
    #[arg(short = 'f', long)]
    force: bool,

    /// Stream buffer size in bytes (minimum 4096)
    #[arg(long, value_name = "BYTES")]
    buffer_size: Option<usize>,

    /// Cleanup deadline after Ctrl-C, in milliseconds
    #[arg(long, value_name = "MS")]
    cancel_timeout_ms: Option<u64>,

    /// Cleanup deadline after a failure, in milliseconds
    #[arg(long, value_name = "MS")]
    fault_timeout_ms: Option<u64>,

    /// Do not sync DEST to disk before reporting success (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Log format for diagnostics written to stderr
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Print nothing on success
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Copy,
    Move,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to start async runtime: {source}")]
    Runtime { source: io::Error },

    #[error("Failed to {operation}: {source}")]
    Transfer {
        operation: &'static str,
        source: GuardcopyError,
    },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Runtime { .. } | Self::JsonSerialize { .. } => ErrorCode::Internal,
            Self::Transfer { source, .. } => source.code(),
        }
    }
}

/// What one invocation did, for both output modes.
#[derive(Debug)]
struct Report {
    operation: Operation,
    source: PathBuf,
    destination: PathBuf,
    outcome: TransferOutcome,
    elapsed: Duration,
}

impl Report {
    fn status(&self) -> &'static str {
        match self.outcome {
            TransferOutcome::Completed { .. } => "completed",
            TransferOutcome::Cancelled => "cancelled",
        }
    }

    fn to_json_value(&self) -> Value {
        json!({
            "schema_version": "1.0",
            "operation": self.operation.as_str(),
            "status": self.status(),
            "source": display_path(&self.source),
            "destination": display_path(&self.destination),
            "bytes": self.outcome.bytes(),
            "elapsed_ms": u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn print_human(&self, verbose: bool) {
        match self.outcome {
            TransferOutcome::Completed { bytes } => {
                let verb = match self.operation {
                    Operation::Copy => "Copied",
                    Operation::Move => "Moved",
                };
                println!(
                    "{verb} {} -> {} ({})",
                    display_path(&self.source),
                    display_path(&self.destination),
                    format_bytes(bytes)
                );
                if verbose {
                    let secs = self.elapsed.as_secs_f64();
                    println!("  Time: {secs:.2}s");
                    if secs > 0.0 {
                        println!(
                            "  Throughput: {}/s",
                            format_bytes((bytes as f64 / secs) as u64)
                        );
                    }
                }
            }
            TransferOutcome::Cancelled => {
                eprintln!(
                    "Cancelled before {} was complete.",
                    display_path(&self.destination)
                );
            }
        }
    }
}

fn failure_json(operation: Operation, args: &Args, error: &CliError) -> Value {
    json!({
        "schema_version": "1.0",
        "operation": operation.as_str(),
        "status": "failed",
        "source": display_path(&args.source),
        "destination": display_path(&args.dest),
        "error_code": error.code().as_str(),
        "error_message": error.to_string(),
    })
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidInput => 2,
        _ => 1,
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let operation = if args.move_source {
        Operation::Move
    } else {
        Operation::Copy
    };

    match run(&args, operation) {
        Ok(report) => {
            if report.outcome.is_cancelled() {
                std::process::exit(130);
            }
        }
        Err(error) => {
            if args.output == OutputMode::Json {
                // Best effort: the human-readable line below still reports
                // the failure.
                print_json_value(&failure_json(operation, &args, &error)).ok();
            }
            eprintln!("error[{}]: {}", error.code(), error);
            std::process::exit(exit_code_for(error.code()));
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    match args.log_format {
        LogFormat::Text => builder.try_init().ok(),
        LogFormat::Json => builder.json().try_init().ok(),
    };
}

fn build_options(args: &Args) -> TransferOptions {
    let mut options = TransferOptions::default();
    if let Some(size) = args.buffer_size {
        options = options.with_buffer_size(size);
    }
    if let Some(ms) = args.cancel_timeout_ms {
        options = options.with_cancel_cleanup_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = args.fault_timeout_ms {
        options = options.with_fault_cleanup_timeout(Duration::from_millis(ms));
    }
    if args.no_sync {
        options = options.without_fsync();
    }
    options
}

fn install_ctrlc_handler(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            eprintln!("\nForce quit.");
            std::process::exit(130);
        }
        cancel.cancel();
        eprintln!("\nCancelling... removing partial output. Press Ctrl+C again to abort immediately.");
    })
    .ok();
}

fn run(args: &Args, operation: Operation) -> CliResult<Report> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| CliError::Runtime { source })?;

    let options = build_options(args);
    debug!(?options, operation = operation.as_str(), "starting");

    let cancel = CancellationToken::new();
    install_ctrlc_handler(&cancel);

    let request = TransferRequest::new(&args.source, &args.dest)
        .with_overwrite(args.force)
        .with_cancel_token(cancel);
    let engine = TransferEngine::new(options);

    let start = Instant::now();
    let result = runtime.block_on(async {
        match operation {
            Operation::Copy => engine.copy_file(&request).await,
            Operation::Move => engine.move_file(&request).await,
        }
    });
    let outcome = result.map_err(|source| CliError::Transfer {
        operation: operation.as_str(),
        source,
    })?;

    let report = Report {
        operation,
        source: args.source.clone(),
        destination: args.dest.clone(),
        outcome,
        elapsed: start.elapsed(),
    };

    match args.output {
        OutputMode::Json => print_json_value(&report.to_json_value())?,
        OutputMode::Human => {
            if report.outcome.is_cancelled() || !args.quiet {
                report.print_human(args.verbose);
            }
        }
    }

    Ok(report)
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
