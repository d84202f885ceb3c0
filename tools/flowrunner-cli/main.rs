use clap::{Parser, Subcommand};
use flowrunner::prelude::*;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Validate and execute agent flows from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log verbosity filter, e.g. `flowrunner=debug`
    #[arg(long, global = true, env = "FLOWRUNNER_LOG", default_value = "flowrunner=info,warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a flow file for structural errors
    Validate {
        /// Path to the flow JSON file
        flow_path: String,
    },
    /// Validate and execute a flow; agent nodes are answered by an offline echo runner
    Run {
        /// Path to the flow JSON file
        flow_path: String,

        /// Initial input handed to the input node
        #[arg(short, long, default_value = "")]
        input: String,

        /// Execute even if validation reports errors
        #[arg(long)]
        skip_validation: bool,

        /// Maximum number of steps before the walk is cut short
        #[arg(long, env = "FLOWRUNNER_MAX_ITERATIONS", default_value_t = flowrunner::executor::DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match cli.command {
        Command::Validate { flow_path } => run_validate(&flow_path),
        Command::Run {
            flow_path,
            input,
            skip_validation,
            max_iterations,
        } => run_flow(&flow_path, &input, skip_validation, max_iterations),
    }
}

/// `RUST_LOG` wins over the `--log` flag when set.
fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run_validate(flow_path: &str) -> ExitCode {
    let raw = match load_flow(flow_path) {
        Ok(raw) => raw,
        Err(message) => return exit_with_error(&message),
    };

    let report = validate(&raw);
    print_json(&report);
    if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_flow(
    flow_path: &str,
    input: &str,
    skip_validation: bool,
    max_iterations: usize,
) -> ExitCode {
    let total_start = Instant::now();

    let raw = match load_flow(flow_path) {
        Ok(raw) => raw,
        Err(message) => return exit_with_error(&message),
    };

    if skip_validation {
        tracing::info!("validation skipped");
    } else {
        let report = validate(&raw);
        if !report.valid {
            print_json(&report);
            return exit_with_error(&format!(
                "Flow '{}' failed validation with {} error(s)",
                flow_path,
                report.errors.len()
            ));
        }
    }

    let executor = FlowExecutor::builder()
        .with_runner(EchoRunner)
        .with_max_iterations(max_iterations)
        .build();

    let response = ExecutionResponse::from(executor.execute_flow(&raw, input));
    print_json(&response);

    tracing::info!(elapsed = ?total_start.elapsed(), status = ?response.status(), "run finished");
    match response.status() {
        ExecutionStatus::Completed => ExitCode::SUCCESS,
        ExecutionStatus::Failed => ExitCode::FAILURE,
    }
}

fn load_flow(path: &str) -> std::result::Result<serde_json::Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read flow file '{}': {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse flow JSON: {}", e))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: could not serialize output: {}", e),
    }
}

fn exit_with_error(message: &str) -> ExitCode {
    eprintln!("\nError: {}", message);
    ExitCode::FAILURE
}
