//! Performance Monitoring CLI — query metrics, errors, and thresholds from the terminal.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use monitor_lib::{format_timestamp_display, stats, Client, Config};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "monitor")]
#[command(about = "Performance Monitoring CLI — query metrics, errors, and thresholds", long_about = None)]
struct Cli {
    /// Base URL of the monitoring API (e.g. https://your-api.onrender.com).
    #[arg(long, env = "MONITOR_API_URL")]
    url: Option<String>,

    /// API key for authenticated endpoints.
    #[arg(long, env = "MONITOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Output format: plain (human-readable), json (structured).
    #[arg(short, long, default_value = "plain", value_enum)]
    output: OutputFormatArg,

    /// Show timestamps in UTC only. By default timestamps are shown in local timezone.
    #[arg(long)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health (no API key required by the server)
    Health,
    /// Show current system metrics
    Metrics,
    /// Show error history
    Errors {
        /// Maximum number of errors to retrieve (server default: 50)
        #[arg(long)]
        limit: Option<u32>,
        /// Filter by error level
        #[arg(long, value_parser = ["ERROR", "WARNING", "INFO"])]
        level: Option<String>,
        /// Show a count per error type instead of the raw list
        #[arg(long)]
        counts: bool,
    },
    /// Show performance metrics history
    Performance {
        /// Maximum number of records to retrieve (server default: 100)
        #[arg(long)]
        limit: Option<u32>,
        /// Show averages and peak usage instead of raw records
        #[arg(long)]
        summary: bool,
    },
    /// Show current performance thresholds
    Thresholds,
    /// Update performance thresholds, e.g. `set-thresholds cpu=85 memory=90`
    SetThresholds {
        /// name=value pairs
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Log a test error
    TestError {
        /// Error type (default: TEST_ERROR)
        #[arg(long)]
        error_type: Option<String>,
        /// Error message (default: "Test error from client")
        #[arg(long)]
        message: Option<String>,
    },
    /// Simulate load on the server (duration is capped at 10 seconds)
    SimulateLoad {
        /// Duration in seconds (default: 5, max: 10)
        #[arg(long)]
        duration: Option<u32>,
        /// Generate memory load instead of CPU load
        #[arg(long)]
        memory: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Version) {
        println!("monitor {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let Some(url) = cli.url.clone() else {
        eprintln!("Error: API URL is required. Set MONITOR_API_URL or pass --url.");
        return ExitCode::FAILURE;
    };
    let Some(api_key) = cli.api_key.clone() else {
        eprintln!("Error: API key is required. Set MONITOR_API_KEY or pass --api-key.");
        return ExitCode::FAILURE;
    };

    let config = Config::new(url, api_key).timeout(Duration::from_secs(cli.timeout));
    let client = match Client::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let format = match cli.output {
        OutputFormatArg::Plain => output::OutputFormat::Plain,
        OutputFormatArg::Json => output::OutputFormat::Json,
    };

    match run(&client, cli.command, format, cli.utc).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    client: &Client,
    cmd: Commands,
    format: output::OutputFormat,
    use_utc: bool,
) -> Result<(), String> {
    let print_value = |v: &Value| match format {
        output::OutputFormat::Plain => {
            let mut v = v.clone();
            humanize_timestamps(&mut v, use_utc);
            print!("{}", output::format_plain(&v));
        }
        output::OutputFormat::Json => println!("{}", output::format_json(v).unwrap()),
    };

    match cmd {
        Commands::Health => {
            let health = client.health_check().await.map_err(|e| e.to_string())?;
            print_value(&health);
        }
        Commands::Metrics => {
            let metrics = client.get_metrics().await.map_err(|e| e.to_string())?;
            print_value(&metrics);
        }
        Commands::Errors {
            limit,
            level,
            counts,
        } => {
            let data = client
                .get_errors(limit, level.as_deref())
                .await
                .map_err(|e| e.to_string())?;
            if counts {
                let errors = as_record_list(&data, "errors");
                let by_type = stats::count_errors_by_type(&errors);
                print_value(&serde_json::to_value(&by_type).unwrap());
            } else {
                print_value(&data);
            }
        }
        Commands::Performance { limit, summary } => {
            let data = client
                .get_performance_history(limit)
                .await
                .map_err(|e| e.to_string())?;
            if summary {
                let metrics = as_record_list(&data, "metrics");
                let report = json!({
                    "records": metrics.len(),
                    "averages": stats::calculate_averages(&metrics),
                    "peak_usage": serde_json::to_value(stats::find_peak_usage(&metrics)).unwrap(),
                });
                print_value(&report);
            } else {
                print_value(&data);
            }
        }
        Commands::Thresholds => {
            let thresholds = client.get_thresholds().await.map_err(|e| e.to_string())?;
            print_value(&thresholds);
        }
        Commands::SetThresholds { pairs } => {
            let thresholds = parse_threshold_pairs(&pairs)?;
            let updated = client
                .update_thresholds(&thresholds)
                .await
                .map_err(|e| e.to_string())?;
            print_value(&updated);
        }
        Commands::TestError {
            error_type,
            message,
        } => {
            let res = client
                .log_test_error(error_type.as_deref(), message.as_deref())
                .await
                .map_err(|e| e.to_string())?;
            print_value(&res);
        }
        Commands::SimulateLoad { duration, memory } => {
            let cpu_intensive = if memory { Some(false) } else { None };
            let res = client
                .simulate_load(duration, cpu_intensive)
                .await
                .map_err(|e| e.to_string())?;
            print_value(&res);
        }
        Commands::Version => {}
    }
    Ok(())
}

/// Pull a named record array out of an API response body.
fn as_record_list(data: &Value, key: &str) -> Vec<Value> {
    data.get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Parse `name=value` pairs into a threshold mapping.
fn parse_threshold_pairs(pairs: &[String]) -> Result<HashMap<String, f64>, String> {
    let mut thresholds = HashMap::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid threshold '{}'. Expected name=value.", pair))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Invalid threshold '{}'. Expected name=value.", pair));
        }
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid threshold value in '{}'. Expected a number.", pair))?;
        thresholds.insert(name.to_string(), value);
    }
    Ok(thresholds)
}

/// Rewrite `timestamp` fields for display in plain output.
fn humanize_timestamps(value: &mut Value, use_utc: bool) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key == "timestamp" {
                    if let Some(ts) = v.as_str() {
                        *v = Value::String(format_timestamp_display(ts, use_utc));
                    }
                } else {
                    humanize_timestamps(v, use_utc);
                }
            }
        }
        Value::Array(arr) => {
            for v in arr {
                humanize_timestamps(v, use_utc);
            }
        }
        _ => {}
    }
}
