use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use promptweave_client::{OllamaClient, DEFAULT_BASE_URL};
use promptweave_core::booking::{
    book_trip, BookingChain, ChainConfig, ChainOutcome, TripConfig, TripOutcome,
};
use promptweave_core::fanout::{FanoutConfig, FanoutOrchestrator, FanoutResult};
use promptweave_core::refine::{RefineConfig, RefineOutcome, RefineRunner};
use promptweave_core::{InputSource, WorkflowError};
use promptweave_logging::{init_tracing, LogEvent, LogFormat, Logger};
use promptweave_store::{BookingStore, BOOKING_STORE_FILE};

mod config;
mod stdin_input;

use config::ProjectConfig;
use stdin_input::StdinSource;

const DEFAULT_MODEL: &str = "phi4";
const DEFAULT_REFINE_MODEL: &str = "mistral-small";

#[derive(Parser, Debug)]
#[command(
    name = "promptweave",
    about = "Agentic workflow patterns over a local model endpoint",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model endpoint base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Model to use for every workflow step
    #[arg(short, long)]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also append events to this JSONL file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Path to the booking store file
    #[arg(long, default_value = BOOKING_STORE_FILE)]
    store: PathBuf,

    /// Output the final result as JSON
    #[arg(long)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gated booking chain with new/modify routing
    Book {
        /// Request text (solicited interactively when omitted)
        input: Option<String>,
    },
    /// Concurrent flight + hotel booking with a combined confirmation
    Trip {
        /// Request text (solicited interactively when omitted)
        input: Option<String>,
    },
    /// Bounded generate/critique refinement loop
    Refine {
        /// Task text (solicited interactively when omitted)
        task: Option<String>,

        /// Maximum generate/evaluate round trips
        #[arg(short = 'n', long, default_value_t = 5)]
        max_iterations: usize,

        /// Model for the generator role
        #[arg(long)]
        generator_model: Option<String>,

        /// Model for the evaluator role
        #[arg(long)]
        evaluator_model: Option<String>,
    },
    /// Fan-out plan/work/select over campaign ideas
    Campaign {
        /// Campaign topic (solicited interactively when omitted)
        topic: Option<String>,

        /// Number of ideas to request from the planner
        #[arg(long, default_value_t = 3)]
        ideas: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("info", log_format);
    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);

    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| config.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let client = OllamaClient::new(endpoint);

    let global_model = cli.model.clone().or_else(|| config.model.clone());
    let model = global_model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let today = Local::now().date_naive();
    let stdin = StdinSource;

    let exit_code = match cli.command {
        Command::Book { input } => {
            let input = resolve_input(input, &stdin, "Please enter your request")?;
            let mut store = BookingStore::open(&cli.store)?;
            let mut chain = BookingChain::new(
                &client,
                &mut store,
                &stdin,
                logger.clone(),
                ChainConfig { model, today },
            );
            let outcome = check(&logger, "booking", chain.run(&input).await)?;

            if cli.json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_chain_outcome(&outcome);
            }
            outcome.exit_code()
        }
        Command::Trip { input } => {
            let input = resolve_input(input, &stdin, "Please enter your request")?;
            let mut store = BookingStore::open(&cli.store)?;
            let outcome = check(
                &logger,
                "trip",
                book_trip(
                    &client,
                    &mut store,
                    &stdin,
                    logger.clone(),
                    &TripConfig { model, today },
                    &input,
                )
                .await,
            )?;

            if cli.json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_trip_outcome(&outcome);
            }
            outcome.exit_code()
        }
        Command::Refine {
            task,
            max_iterations,
            generator_model,
            evaluator_model,
        } => {
            let task = resolve_input(task, &stdin, "Please enter the task")?;

            let generator_model = generator_model
                .or_else(|| config.refine.generator_model.clone())
                .or_else(|| global_model.clone())
                .unwrap_or_else(|| DEFAULT_REFINE_MODEL.to_string());
            let evaluator_model = evaluator_model
                .or_else(|| config.refine.evaluator_model.clone())
                .or_else(|| global_model.clone())
                .unwrap_or_else(|| DEFAULT_REFINE_MODEL.to_string());

            let runner = RefineRunner::new(
                &client,
                &client,
                RefineConfig::new(generator_model, evaluator_model, max_iterations),
                logger.clone(),
            );

            // Finish the current round trip, then stop.
            let interrupt_handle = runner.interrupt_handle();
            ctrlc::set_handler(move || {
                eprintln!("\nInterrupted. Finishing current iteration...");
                interrupt_handle.store(true, Ordering::SeqCst);
            })
            .context("Failed to set Ctrl+C handler")?;

            let outcome = check(&logger, "refine", runner.run(&task).await)?;

            if cli.json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_refine_outcome(&outcome);
            }
            outcome.exit_code()
        }
        Command::Campaign { topic, ideas } => {
            let topic = resolve_input(topic, &stdin, "Please enter the campaign topic")?;
            let orchestrator =
                FanoutOrchestrator::new(&client, FanoutConfig::new(model), logger.clone());
            let result = check(&logger, "campaign", orchestrator.run(&topic, ideas).await)?;

            if cli.json_output {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_fanout_result(&result);
            }
            0
        }
    };

    std::process::exit(exit_code);
}

/// Log a workflow failure before propagating it
fn check<T>(logger: &Logger, stage: &str, result: Result<T, WorkflowError>) -> Result<T> {
    result.map_err(|err| {
        logger.log(&LogEvent::ErrorEncountered {
            stage: stage.to_string(),
            error: err.to_string(),
        });
        anyhow::Error::new(err)
    })
}

fn resolve_input(arg: Option<String>, stdin: &StdinSource, prompt: &str) -> Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => stdin
            .request_line(prompt)
            .context("Failed to read request text"),
    }
}

fn print_chain_outcome(outcome: &ChainOutcome) {
    match outcome {
        ChainOutcome::Confirmed {
            ticket_id,
            action,
            message,
        } => {
            eprintln!();
            eprintln!("{}", "=== BOOKING CONFIRMED ===".bright_green().bold());
            eprintln!("Ticket ID: {}", ticket_id);
            eprintln!("Action: {}", action.as_str());
            eprintln!("{}", message);
        }
        ChainOutcome::Declined { .. } => {
            eprintln!();
            eprintln!("{}", "=== DECLINED ===".bright_red().bold());
            eprintln!("Sorry, I cannot help you with this request.");
        }
    }
}

fn print_trip_outcome(outcome: &TripOutcome) {
    match outcome {
        TripOutcome::Booked {
            ticket_id,
            combined_message,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "=== TRIP BOOKED ===".bright_green().bold());
            eprintln!("Ticket ID: {}", ticket_id);
            eprintln!("{}", combined_message);
        }
        TripOutcome::FlightDeclined { hotel_message, .. } => {
            eprintln!();
            eprintln!("{}", "=== FLIGHT DECLINED ===".bright_red().bold());
            eprintln!("Sorry, I cannot help you with the flight request.");
            eprintln!("Hotel: {}", hotel_message);
        }
    }
}

fn print_refine_outcome(outcome: &RefineOutcome) {
    match outcome {
        RefineOutcome::Passed {
            iterations, draft, ..
        } => {
            eprintln!();
            eprintln!("{}", "=== PASSED ===".bright_green().bold());
            eprintln!("Iterations: {}", iterations);
            eprintln!("{}", draft);
        }
        RefineOutcome::Exhausted {
            iterations,
            last_draft,
            last_feedback,
            ..
        } => {
            eprintln!();
            eprintln!("{}", "=== EXHAUSTED ===".bright_yellow().bold());
            eprintln!("No pass within {} iteration(s).", iterations);
            eprintln!("Last draft: {}", last_draft);
            eprintln!("Last feedback: {}", last_feedback);
        }
        RefineOutcome::Interrupted { iterations, .. } => {
            eprintln!();
            eprintln!("{}", "=== INTERRUPTED ===".bright_yellow().bold());
            eprintln!("User stopped after {} iteration(s)", iterations);
        }
    }
}

fn print_fanout_result(result: &FanoutResult) {
    eprintln!();
    eprintln!("{}", "=== IDEAS ===".bright_blue().bold());
    for output in &result.outputs {
        eprintln!("--- {} ---", output.title);
        eprintln!("{}", output.content);
        eprintln!();
    }
    eprintln!("{}", "=== BEST IDEA ===".bright_yellow().bold());
    eprintln!("{}", result.best.title);
    eprintln!("Reason: {}", result.best.reason);
}
