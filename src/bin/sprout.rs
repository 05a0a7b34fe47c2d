//! Sprout CLI - Command-line interface for Sprout Insight
//!
//! Commands:
//! - score: Score logged signals into per-target interest results
//! - profile: Classify activity metrics into an archetype profile
//! - validate: Validate signal input
//! - schema: Print input/output schema information

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sprout_insight::adapter::InputAdapter;
use sprout_insight::types::{ActivityMetric, InsightPayload, InterestResult, Signal};
use sprout_insight::{
    EngineConfig, InsightEncoder, InsightProcessor, INSIGHT_VERSION, REPORT_SCHEMA_VERSION,
};

/// Sprout - On-device interest scoring and archetype classification
#[derive(Parser)]
#[command(name = "sprout")]
#[command(author = "Sprout Labs")]
#[command(version = INSIGHT_VERSION)]
#[command(about = "Score behavioral signals into interests and profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score signals into interest results
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Only score this target (all logged targets otherwise)
        #[arg(long)]
        target: Option<String>,

        /// Reference time for decay (RFC 3339, defaults to now)
        #[arg(long)]
        now: Option<String>,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify activity metrics into a profile
    Profile {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate signal input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON report followed by a newline
    Ndjson,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (signals and activity metrics)
    Input,
    /// Output schema (insight.report.v1)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SproutCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            target,
            now,
            input_format,
            output_format,
            config,
        } => cmd_score(
            &input,
            &output,
            target.as_deref(),
            now.as_deref(),
            input_format,
            output_format,
            config.as_deref(),
        ),

        Commands::Profile {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_profile(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    target: Option<&str>,
    now: Option<&str>,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), SproutCliError> {
    let now = parse_now(now)?;
    let config = load_config(config)?;

    let input_data = read_input(input)?;
    let signals = parse_signals(&input_data, &input_format)?;

    let interests = score_signals(signals, target, now, config)?;

    let payload = InsightEncoder::new().encode(interests, None);
    write_output(output, &format_output(&payload, &output_format)?)
}

fn score_signals(
    signals: Vec<Signal>,
    target: Option<&str>,
    now: DateTime<Utc>,
    config: EngineConfig,
) -> Result<Vec<InterestResult>, SproutCliError> {
    // A named target with no signals still scores as "New"
    if signals.is_empty() && target.is_none() {
        return Err(SproutCliError::NoRecords);
    }

    let mut processor = InsightProcessor::with_config(config).map_err(SproutCliError::Config)?;
    for signal in signals {
        processor.log_signal(signal)?;
    }

    Ok(match target {
        Some(target) => vec![processor.interest_for(target, now)],
        None => processor.interests(now),
    })
}

fn cmd_profile(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), SproutCliError> {
    let config = load_config(config)?;

    let input_data = read_input(input)?;
    let metrics: Vec<ActivityMetric> = match input_format {
        InputFormat::Ndjson => InputAdapter::parse_metrics_ndjson(&input_data)?,
        InputFormat::Json => InputAdapter::parse_metrics(&input_data)?,
    };

    let processor = InsightProcessor::with_config(config).map_err(SproutCliError::Config)?;
    let profile = processor.profile(&metrics);

    let payload = InsightEncoder::new().encode(Vec::new(), Some(profile));
    write_output(output, &format_output(&payload, &output_format)?)
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), SproutCliError> {
    let input_data = read_input(input)?;
    let signals = parse_signals(&input_data, &input_format)?;

    let results = InputAdapter::validate_signals(&signals);

    let report = ValidationReport {
        total_signals: signals.len(),
        valid_signals: signals.len() - results.len(),
        invalid_signals: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                signal_id: r.signal_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total signals:   {}", report.total_signals);
        println!("Valid signals:   {}", report.valid_signals);
        println!("Invalid signals: {}", report.invalid_signals);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Signal {} (index {}): {}",
                    err.signal_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_signals > 0 {
        Err(SproutCliError::ValidationFailed(report.invalid_signals))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), SproutCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", serde_json::to_string_pretty(&input_json_schema())?);
            } else {
                println!("Input Schemas");
                println!();
                println!("1. signal - One observed behavioral event (score, validate)");
                println!("   - type: choice | time | effort | emotion | temperament");
                println!("   - target: topic label, e.g. \"MATH\"");
                println!("   - value: non-negative magnitude (count, seconds, 0-10 effort, 0-1 emotion)");
                println!("   - context: optional text; keywords mark the source");
                println!("     (Mission, Life/Market, Simulation/Scenario, Question)");
                println!("   - timestamp: epoch milliseconds");
                println!();
                println!("2. activity metric - One task attempt (profile)");
                println!("   - task_type: task label");
                println!("   - is_completed: boolean");
                println!("   - engagement_depth: avoidant | low | medium | high");
                println!("   - emotional_feedback: happy | neutral | frustrated | stressed | bored");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", serde_json::to_string_pretty(&output_json_schema())?);
            } else {
                println!("Output Schema: {}", REPORT_SCHEMA_VERSION);
                println!();
                println!("- schema_version: Report schema version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- computed_at_utc: RFC 3339 timestamp");
                println!("- interests: Array of interest results containing:");
                println!("  - target, score, trend, dominant_signal");
                println!("  - status: neutral | emerging | confirmed");
                println!("  - breakdown: {{ base_score, effort_bonus, time_multiplier, weeks_active, source_types, signal_count }}");
                println!("- profile (optional):");
                println!("  - archetype: undefined | negotiator | builder | observer | explorer | performer");
                println!("  - metrics: {{ task_avoidance_freq, completion_speed, preference_clusters,");
                println!("               reward_sensitivity, frustration_signals, completion_rate, sample_size }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, SproutCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(SproutCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), SproutCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn parse_signals(input_data: &str, format: &InputFormat) -> Result<Vec<Signal>, SproutCliError> {
    let signals = match format {
        InputFormat::Ndjson => InputAdapter::parse_signals_ndjson(input_data)?,
        InputFormat::Json => InputAdapter::parse_signals(input_data)?,
    };
    Ok(signals)
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, SproutCliError> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SproutCliError::InvalidArgument(format!("--now {}: {}", s, e))),
        None => Ok(Utc::now()),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, SproutCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            EngineConfig::from_json(&json).map_err(SproutCliError::Config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn format_output(payload: &InsightPayload, format: &OutputFormat) -> Result<String, SproutCliError> {
    match format {
        OutputFormat::Ndjson => Ok(serde_json::to_string(payload)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(payload)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payload)? + "\n"),
    }
}

fn input_json_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "definitions": {
            "signal": {
                "type": "object",
                "required": ["type", "target", "value", "timestamp"],
                "properties": {
                    "signal_id": { "type": "string" },
                    "type": { "enum": ["choice", "time", "effort", "emotion", "temperament"] },
                    "target": { "type": "string", "minLength": 1 },
                    "value": { "type": "number", "minimum": 0 },
                    "context": { "type": "string" },
                    "timestamp": { "type": "integer", "description": "epoch milliseconds" }
                }
            },
            "activity_metric": {
                "type": "object",
                "required": ["task_type", "is_completed", "engagement_depth", "emotional_feedback"],
                "properties": {
                    "task_type": { "type": "string" },
                    "is_completed": { "type": "boolean" },
                    "engagement_depth": { "enum": ["avoidant", "low", "medium", "high"] },
                    "emotional_feedback": { "enum": ["happy", "neutral", "frustrated", "stressed", "bored"] }
                }
            }
        }
    })
}

fn output_json_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": REPORT_SCHEMA_VERSION,
        "type": "object",
        "required": ["schema_version", "producer", "computed_at_utc", "interests"],
        "properties": {
            "schema_version": { "const": REPORT_SCHEMA_VERSION },
            "producer": {
                "type": "object",
                "required": ["name", "version", "instance_id"]
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "interests": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["target", "score", "trend", "dominant_signal", "status", "breakdown"],
                    "properties": {
                        "score": { "type": "number", "minimum": 0 },
                        "status": { "enum": ["neutral", "emerging", "confirmed"] }
                    }
                }
            },
            "profile": {
                "type": "object",
                "required": ["archetype", "metrics"],
                "properties": {
                    "archetype": {
                        "enum": ["undefined", "negotiator", "builder", "observer", "explorer", "performer"]
                    }
                }
            }
        }
    })
}

// Error handling

#[derive(Debug)]
enum SproutCliError {
    Io(io::Error),
    Compute(sprout_insight::ComputeError),
    Json(serde_json::Error),
    Config(sprout_insight::ComputeError),
    InvalidArgument(String),
    NoInput,
    NoRecords,
    ValidationFailed(usize),
}

impl From<io::Error> for SproutCliError {
    fn from(e: io::Error) -> Self {
        SproutCliError::Io(e)
    }
}

impl From<sprout_insight::ComputeError> for SproutCliError {
    fn from(e: sprout_insight::ComputeError) -> Self {
        SproutCliError::Compute(e)
    }
}

impl From<serde_json::Error> for SproutCliError {
    fn from(e: serde_json::Error) -> Self {
        SproutCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SproutCliError> for CliError {
    fn from(e: SproutCliError) -> Self {
        match e {
            SproutCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SproutCliError::Compute(e @ sprout_insight::ComputeError::InvalidSignal(_)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'sprout validate' for details".to_string()),
            },
            SproutCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'sprout schema input' for the expected shape".to_string()),
            },
            SproutCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SproutCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the --config file values".to_string()),
            },
            SproutCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: Some("Timestamps use RFC 3339, e.g. 2024-03-01T09:00:00Z".to_string()),
            },
            SproutCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, nothing to read".to_string(),
                hint: Some("Pipe input into sprout or pass --input <file>".to_string()),
            },
            SproutCliError::NoRecords => CliError {
                code: "NO_SIGNALS".to_string(),
                message: "No signals found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SproutCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} signals failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_signals: usize,
    valid_signals: usize,
    invalid_signals: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    signal_id: Option<String>,
    error: String,
}
