//! # sqsx
//!
//! Command-line front end for the `sqs-client` library.
//!
//! Batch entries are read from JSON or YAML files using the wire field
//! names, either as a bare list of entries or as a full batch input:
//!
//! ```yaml
//! QueueUrl: https://sqs.us-east-1.amazonaws.com/123456789012/orders
//! Entries:
//!   - Id: "1"
//!     ReceiptHandle: AQEBwJnKyrHigUMZj6rYigCgxlaS3SLy0a...
//! ```
//!
//! `sqsx validate` checks such a file locally without any network access.

use clap::{CommandFactory, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqs_client::{
    with_cancellation, BatchEntry, BatchInput, BatchOutput, BatchResultEntry,
    ChangeMessageVisibilityBatchRequestEntry, ClientConfig, ConfigurationError,
    DeleteMessageBatchRequestEntry, DeleteMessageInput, GetQueueUrlInput, ListQueuesInput,
    PurgeQueueInput, ReceiveMessageInput, SendMessageBatchRequestEntry, SendMessageInput,
    SqsClient, SqsError, Validate,
};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// ============================================================================
// CLI Structure
// ============================================================================

/// sqsx - validate and run SQS batch operations
#[derive(Parser, Debug)]
#[command(name = "sqsx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and run SQS batch operations")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SQSX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a batch file locally without sending it
    Validate {
        /// Kind of batch the file holds
        #[arg(short, long, value_enum)]
        kind: BatchKind,

        /// JSON or YAML file with the batch entries
        #[arg(long)]
        file: PathBuf,

        /// Queue URL, overriding the one in the file
        #[arg(short, long)]
        queue_url: Option<String>,
    },

    /// Send a batch of messages
    SendBatch {
        #[arg(short, long)]
        queue_url: Option<String>,

        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a batch of messages
    DeleteBatch {
        #[arg(short, long)]
        queue_url: Option<String>,

        #[arg(long)]
        file: PathBuf,
    },

    /// Change the visibility timeout of a batch of messages
    ChangeVisibilityBatch {
        #[arg(short, long)]
        queue_url: Option<String>,

        #[arg(long)]
        file: PathBuf,
    },

    /// Send one message
    Send {
        #[arg(short, long)]
        queue_url: String,

        /// Message body
        #[arg(short, long)]
        body: String,

        #[arg(long)]
        delay_seconds: Option<i64>,

        /// Message group id (FIFO queues)
        #[arg(long)]
        group_id: Option<String>,

        /// Deduplication id (FIFO queues)
        #[arg(long)]
        dedup_id: Option<String>,
    },

    /// Receive messages
    Receive {
        #[arg(short, long)]
        queue_url: String,

        /// Maximum number of messages to return (1-10)
        #[arg(short, long)]
        max: Option<i64>,

        /// Long-poll wait time in seconds
        #[arg(short, long)]
        wait_seconds: Option<i64>,

        #[arg(long)]
        visibility_timeout: Option<i64>,
    },

    /// Delete one message
    Delete {
        #[arg(short, long)]
        queue_url: String,

        #[arg(short, long)]
        receipt_handle: String,
    },

    /// Look up the URL of a queue by name
    GetQueueUrl {
        #[arg(short = 'n', long)]
        queue_name: String,
    },

    /// List queues
    ListQueues {
        /// Only list queues whose name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Delete every message in a queue
    Purge {
        #[arg(short, long)]
        queue_url: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Batch operation a file is meant for
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BatchKind {
    Send,
    Delete,
    ChangeVisibility,
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    Json,
    Yaml,
}

// ============================================================================
// CLI Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Client(#[from] SqsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Batch is invalid: {count} validation error(s)")]
    ValidationFailed { count: usize },

    #[error("{failed} of {total} batch entries failed")]
    PartialFailure { failed: usize, total: usize },
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Client(SqsError::Validation(_)) => 2,
            Self::Client(_) => 3,
            Self::Io(_) => 4,
            Self::InvalidInput { .. } => 5,
            Self::Serialization { .. } => 6,
            Self::ValidationFailed { .. } => 2,
            Self::PartialFailure { .. } => 7,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Parse the command line, set up logging and run the selected command
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli.log_level, cli.json_logs);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out).await
}

/// Run a parsed command, writing results to `out`
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let format = cli.format;

    match cli.command {
        Commands::Validate {
            kind,
            file,
            queue_url,
        } => match kind {
            BatchKind::Send => {
                let input = load_batch::<SendMessageBatchRequestEntry>(&file, queue_url)?;
                execute_validate(&input, format, out)
            }
            BatchKind::Delete => {
                let input = load_batch::<DeleteMessageBatchRequestEntry>(&file, queue_url)?;
                execute_validate(&input, format, out)
            }
            BatchKind::ChangeVisibility => {
                let input =
                    load_batch::<ChangeMessageVisibilityBatchRequestEntry>(&file, queue_url)?;
                execute_validate(&input, format, out)
            }
        },
        Commands::SendBatch { queue_url, file } => {
            let input = load_batch::<SendMessageBatchRequestEntry>(&file, queue_url)?;
            let client = build_client(cli.config.as_deref())?;
            let output = interruptible(client.send_message_batch(&input)).await?;
            report_batch(&output, format, out)
        }
        Commands::DeleteBatch { queue_url, file } => {
            let input = load_batch::<DeleteMessageBatchRequestEntry>(&file, queue_url)?;
            let client = build_client(cli.config.as_deref())?;
            let output = interruptible(client.delete_message_batch(&input)).await?;
            report_batch(&output, format, out)
        }
        Commands::ChangeVisibilityBatch { queue_url, file } => {
            let input = load_batch::<ChangeMessageVisibilityBatchRequestEntry>(&file, queue_url)?;
            let client = build_client(cli.config.as_deref())?;
            let output = interruptible(client.change_message_visibility_batch(&input)).await?;
            report_batch(&output, format, out)
        }
        Commands::Send {
            queue_url,
            body,
            delay_seconds,
            group_id,
            dedup_id,
        } => {
            let input = SendMessageInput {
                delay_seconds,
                message_group_id: group_id,
                message_deduplication_id: dedup_id,
                ..SendMessageInput::new(queue_url, body)
            };
            let client = build_client(cli.config.as_deref())?;
            let output = interruptible(client.send_message(&input)).await?;
            write_output(out, format, &output, |o| {
                format!("sent {}", o.message_id.as_deref().unwrap_or("-"))
            })
        }
        Commands::Receive {
            queue_url,
            max,
            wait_seconds,
            visibility_timeout,
        } => {
            let input = ReceiveMessageInput {
                max_number_of_messages: max,
                wait_time_seconds: wait_seconds,
                visibility_timeout,
                ..ReceiveMessageInput::new(queue_url)
            };
            let client = build_client(cli.config.as_deref())?;
            let output = interruptible(client.receive_message(&input)).await?;
            write_output(out, format, &output, |o| {
                o.messages
                    .iter()
                    .map(|m| {
                        format!(
                            "{}\t{}\t{}",
                            m.message_id.as_deref().unwrap_or("-"),
                            m.receipt_handle.as_deref().unwrap_or("-"),
                            m.body.as_deref().unwrap_or("")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Delete {
            queue_url,
            receipt_handle,
        } => {
            let client = build_client(cli.config.as_deref())?;
            let input = DeleteMessageInput::new(queue_url, receipt_handle);
            let output = interruptible(client.delete_message(&input)).await?;
            write_output(out, format, &output, |_| "deleted".to_string())
        }
        Commands::GetQueueUrl { queue_name } => {
            let client = build_client(cli.config.as_deref())?;
            let input = GetQueueUrlInput::new(queue_name);
            let output = interruptible(client.get_queue_url(&input)).await?;
            write_output(out, format, &output, |o| o.queue_url.clone())
        }
        Commands::ListQueues { prefix } => {
            let client = build_client(cli.config.as_deref())?;
            let input = ListQueuesInput {
                queue_name_prefix: prefix,
            };
            let output = interruptible(client.list_queues(&input)).await?;
            write_output(out, format, &output, |o| o.queue_urls.join("\n"))
        }
        Commands::Purge { queue_url } => {
            let client = build_client(cli.config.as_deref())?;
            let input = PurgeQueueInput::new(queue_url);
            let output = interruptible(client.purge_queue(&input)).await?;
            write_output(out, format, &output, |_| "purge requested".to_string())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sqsx", out);
            Ok(())
        }
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Install the global tracing subscriber; `RUST_LOG` overrides `level`
pub fn initialize_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sqs_client={0},sqs_cli={0}", level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

fn build_client(config_path: Option<&Path>) -> Result<SqsClient, CliError> {
    let config = ClientConfig::load(config_path)?;
    debug!(endpoint = %config.endpoint_url(), region = %config.region, "Loaded configuration");
    Ok(SqsClient::new(config)?)
}

/// Cancel the call when the process receives Ctrl-C
async fn interruptible<T, F>(operation: F) -> Result<T, SqsError>
where
    F: Future<Output = Result<T, SqsError>>,
{
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            let _ = cancel_tx.send(());
        }
    });

    let result = with_cancellation(operation, cancel_rx).await;
    watcher.abort();
    result
}

/// Either a bare list of entries or a complete batch input
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum BatchFile<E> {
    Entries(Vec<E>),
    Input(BatchInput<E>),
}

/// Read a batch file; `queue_url` overrides the URL stored in the file
pub fn load_batch<E>(path: &Path, queue_url: Option<String>) -> Result<BatchInput<E>, CliError>
where
    E: BatchEntry + DeserializeOwned,
{
    let contents = std::fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed: BatchFile<E> = if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| CliError::InvalidInput {
            message: format!("{}: {}", path.display(), e),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|e| CliError::InvalidInput {
            message: format!("{}: {}", path.display(), e),
        })?
    };

    let mut input = match parsed {
        BatchFile::Entries(entries) => BatchInput {
            queue_url: None,
            entries: Some(entries),
        },
        BatchFile::Input(input) => input,
    };
    if queue_url.is_some() {
        input.queue_url = queue_url;
    }

    debug!(path = %path.display(), entries = input.entries().len(), "Loaded batch file");
    Ok(input)
}

#[derive(Serialize)]
struct FaultReport {
    path: String,
    message: String,
    #[serde(skip)]
    line: String,
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    entries: usize,
    faults: Vec<FaultReport>,
}

fn execute_validate<E: BatchEntry>(
    input: &BatchInput<E>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let faults = match input.validate() {
        Ok(()) => Vec::new(),
        Err(err) => err.into_faults(),
    };

    let report = ValidationReport {
        valid: faults.is_empty(),
        entries: input.entries().len(),
        faults: faults
            .iter()
            .map(|fault| FaultReport {
                path: fault.path().to_string(),
                message: fault.reason(),
                line: fault.to_string(),
            })
            .collect(),
    };

    write_output(out, format, &report, |r| {
        if r.valid {
            format!("valid: {} entries", r.entries)
        } else {
            let mut lines = vec![format!("invalid: {} fault(s)", r.faults.len())];
            lines.extend(
                r.faults
                    .iter()
                    .map(|f| format!("  {}", f.line)),
            );
            lines.join("\n")
        }
    })?;

    if faults.is_empty() {
        info!(entries = report.entries, "Batch is valid");
        Ok(())
    } else {
        Err(CliError::ValidationFailed {
            count: faults.len(),
        })
    }
}

fn report_batch<S>(
    output: &BatchOutput<S>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    S: BatchResultEntry + Serialize,
{
    write_output(out, format, output, |o| {
        let mut lines: Vec<String> = o
            .successful
            .iter()
            .map(|entry| format!("ok      {}", entry.id()))
            .collect();
        lines.extend(o.failed.iter().map(|entry| {
            format!(
                "failed  {}  {} ({} fault){}",
                entry.id,
                entry.code,
                if entry.sender_fault { "sender" } else { "service" },
                entry
                    .message
                    .as_deref()
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default()
            )
        }));
        lines.join("\n")
    })?;

    if output.has_failures() {
        Err(CliError::PartialFailure {
            failed: output.failed.len(),
            total: output.len(),
        })
    } else {
        Ok(())
    }
}

/// Render `value` as JSON, YAML or the given text form
fn write_output<T, F>(
    out: &mut dyn Write,
    format: OutputFormat,
    value: &T,
    text: F,
) -> Result<(), CliError>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    let rendered = match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Serialization {
                message: e.to_string(),
            })?
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| CliError::Serialization {
            message: e.to_string(),
        })?,
    };

    writeln!(out, "{}", rendered.trim_end())?;
    Ok(())
}
