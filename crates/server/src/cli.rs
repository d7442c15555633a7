//! Command line front end.
//!
//! Argument definitions plus the analyze/batch/validate commands. Commands
//! write results to `out` and diagnostics to `diag` so callers choose the
//! streams (stdout/stderr in the binary, buffers in tests).

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use spiral_core::{
    create_event, execute, Config, Event, EventContext, MemoryStore, NewMemory,
    OrchestratorResult, PipelineMode,
};
use tracing::{debug, warn};

/// Text analyzed when `analyze` gets no `--text`.
pub const DEFAULT_TEXT: &str = "Hello SpiralMind";

#[derive(Debug, Parser)]
#[command(
    name = "spiral",
    version,
    about = "SpiralMind Nexus - heuristic scoring and accept/revise decision pipeline"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        long,
        env = "SPIRAL_CONFIG",
        default_value = "config/config.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override pipeline mode (VERIFICATION, CREATIVE, BALANCED)
    #[arg(long, global = true)]
    pub mode: Option<PipelineMode>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a single text
    Analyze {
        /// Input text to process
        #[arg(long, default_value = DEFAULT_TEXT)]
        text: String,
        /// Print processing statistics to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Analyze a JSON array of texts or {text, context} objects
    Batch {
        file: PathBuf,
        /// Print batch statistics to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Validate configuration only
    Validate,
    /// Start the HTTP/WebSocket API
    Serve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options shared by the printing commands.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub quiet: bool,
    pub stats: bool,
}

/// One line of command output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub decision: String,
    pub confidence: f64,
    pub success: f64,
    pub iterations: u64,
}

impl Payload {
    fn from_result(result: &OrchestratorResult, iterations: u32) -> Self {
        Self {
            decision: result.decision.to_string(),
            confidence: result.score.confidence,
            success: result.score.success,
            iterations: u64::from(iterations),
        }
    }

    fn valid() -> Self {
        Self {
            decision: "VALID".to_string(),
            confidence: 1.0,
            success: 1.0,
            iterations: 0,
        }
    }

    fn text_line(&self) -> String {
        format!(
            "[{}] conf={:.3} succ={:.3} iters={}",
            self.decision, self.confidence, self.success, self.iterations
        )
    }
}

pub fn render(payload: &Payload, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(payload)?,
        OutputFormat::Text => payload.text_line(),
    })
}

/// Record a result as an episodic memory. Failures are logged, not fatal.
pub fn remember(store: &dyn MemoryStore, event: &Event, result: &OrchestratorResult) {
    let memory = NewMemory::from_result(event.text.clone(), event.context.clone(), result);
    match store.store(memory) {
        Ok(id) => debug!("Recorded memory {}", id),
        Err(e) => warn!("Failed to record memory: {}", e),
    }
}

/// Parse a batch file body into events.
///
/// Strings become events with an empty context; objects contribute `text`
/// (default empty) and `context`. Anything else is skipped.
pub fn parse_batch(contents: &str) -> Result<Vec<Event>> {
    let items: Vec<Value> =
        serde_json::from_str(contents).context("Invalid JSON in batch file")?;

    let mut events = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::String(text) => events.push(create_event(text, None)),
            Value::Object(mut map) => {
                let text = match map.remove("text") {
                    Some(Value::String(text)) => text,
                    _ => String::new(),
                };
                let context = match map.remove("context") {
                    Some(value) => match serde_json::from_value::<EventContext>(value) {
                        Ok(context) => context,
                        Err(e) => {
                            warn!("Skipping item {}: invalid context: {}", i, e);
                            continue;
                        }
                    },
                    None => EventContext::new(),
                };
                events.push(create_event(text, Some(context)));
            }
            other => warn!("Skipping invalid item {}: {}", i, other),
        }
    }
    Ok(events)
}

pub fn analyze(
    config: &Config,
    text: &str,
    opts: OutputOptions,
    memory: Option<&dyn MemoryStore>,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<()> {
    let event = create_event(text, None);
    let (result, iterations) = execute(&event, config)?;

    if let Some(store) = memory {
        remember(store, &event, &result);
    }

    writeln!(out, "{}", render(&Payload::from_result(&result, iterations), opts.format)?)?;

    if opts.stats {
        writeln!(diag, "\n=== Statistics ===")?;
        writeln!(diag, "Pipeline mode: {}", result.pipeline_mode)?;
        writeln!(diag, "Confidence: {:.4}", result.score.confidence)?;
        writeln!(diag, "Success: {:.4}", result.score.success)?;
        writeln!(diag, "Iterations: {}", iterations)?;
    }
    Ok(())
}

pub fn batch(
    config: &Config,
    contents: &str,
    opts: OutputOptions,
    memory: Option<&dyn MemoryStore>,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<()> {
    let events = parse_batch(contents)?;

    let mut results = Vec::with_capacity(events.len());
    for event in &events {
        let (result, iterations) = execute(event, config)?;
        if let Some(store) = memory {
            remember(store, event, &result);
        }
        results.push(Payload::from_result(&result, iterations));
    }

    let n = results.len();
    let average = |f: fn(&Payload) -> f64| {
        if n == 0 {
            0.0
        } else {
            results.iter().map(f).sum::<f64>() / n as f64
        }
    };
    let average_confidence = average(|p| p.confidence);
    let average_success = average(|p| p.success);

    if !opts.quiet {
        let summary = Payload {
            decision: "BATCH".to_string(),
            confidence: average_confidence,
            success: average_success,
            iterations: n as u64,
        };
        writeln!(out, "{}", render(&summary, opts.format)?)?;
    }

    match opts.format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&results)?)?,
        OutputFormat::Text => {
            for (i, payload) in results.iter().enumerate() {
                writeln!(out, "Item {}: {}", i + 1, payload.text_line())?;
            }
        }
    }

    if opts.stats && n > 0 {
        writeln!(diag, "\n=== Batch Statistics ===")?;
        writeln!(diag, "Processed: {} items", n)?;
        writeln!(diag, "Average confidence: {:.3}", average_confidence)?;
        writeln!(diag, "Average success: {:.3}", average_success)?;
        writeln!(
            diag,
            "Total iterations: {}",
            results.iter().map(|p| p.iterations).sum::<u64>()
        )?;
    }
    Ok(())
}

pub fn validate(format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", render(&Payload::valid(), format)?)?;
    Ok(())
}
