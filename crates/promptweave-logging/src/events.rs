use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for workflow runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    WorkflowStarted {
        workflow: String,
        input: String,
    },
    ClassificationCompleted {
        is_ticket_booking: bool,
        action: String,
    },
    /// The gate rejected the request; no further model calls follow.
    RequestDeclined {
        description: String,
    },
    ExtractionCompleted {
        source: String,
        destination: String,
        departure_date: Option<String>,
        return_date: Option<String>,
    },
    InputSolicited {
        prompt: String,
    },
    BookingPersisted {
        ticket_id: u32,
        action: String,
    },
    ConfirmationGenerated {
        message: String,
    },
    HotelBooked {
        message: String,
    },
    TripCombined {
        message: String,
    },
    DraftGenerated {
        iteration: usize,
        preview: String,
    },
    VerdictReturned {
        iteration: usize,
        verdict: String,
        feedback: String,
    },
    IterationLimitReached {
        iterations: usize,
    },
    PlanCreated {
        topic: String,
        items: usize,
    },
    WorkerStarted {
        index: usize,
        title: String,
    },
    WorkerCompleted {
        index: usize,
        title: String,
    },
    SelectionMade {
        title: String,
        reason: String,
    },
    ErrorEncountered {
        stage: String,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for workflow events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON lines
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::WorkflowStarted { workflow, input } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {}",
                    "promptweave".bold().bright_white(),
                    workflow.bright_blue().bold()
                );
                let _ = writeln!(stderr, "  {} {}", "Input:".dimmed(), truncate(input, 80));
                let _ = writeln!(stderr);
            }
            LogEvent::ClassificationCompleted {
                is_ticket_booking,
                action,
            } => {
                let mark = if *is_ticket_booking {
                    "✓".bright_green()
                } else {
                    "✗".bright_red()
                };
                let _ = writeln!(
                    stderr,
                    "  {} {} booking={} action={}",
                    mark,
                    "CLASSIFY".bright_cyan().bold(),
                    is_ticket_booking,
                    action
                );
            }
            LogEvent::RequestDeclined { description } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "✗".bright_red(),
                    truncate(description, 80).bright_red()
                );
            }
            LogEvent::ExtractionCompleted {
                source,
                destination,
                departure_date,
                return_date,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} → {} depart={} return={}",
                    "✓".bright_green(),
                    "EXTRACT".bright_cyan().bold(),
                    source,
                    destination,
                    departure_date.as_deref().unwrap_or("?"),
                    return_date.as_deref().unwrap_or("-")
                );
            }
            LogEvent::InputSolicited { prompt } => {
                let _ = writeln!(stderr, "  {} {}", "?".bright_yellow(), prompt.dimmed());
            }
            LogEvent::BookingPersisted { ticket_id, action } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} ticket={} ({})",
                    "✓".bright_green(),
                    "PERSIST".bright_cyan().bold(),
                    ticket_id,
                    action
                );
            }
            LogEvent::ConfirmationGenerated { message } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "✓".bright_green(),
                    "CONFIRM".bright_cyan().bold(),
                    truncate(message, 80)
                );
            }
            LogEvent::HotelBooked { message } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "✓".bright_green(),
                    "HOTEL".bright_cyan().bold(),
                    truncate(message, 80)
                );
            }
            LogEvent::TripCombined { message } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "✓".bright_green(),
                    "TRIP".bright_cyan().bold(),
                    truncate(message, 80)
                );
            }
            LogEvent::DraftGenerated { iteration, preview } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} #{} {}",
                    "▶".bright_cyan(),
                    "DRAFT".bright_cyan().bold(),
                    iteration + 1,
                    truncate(preview, 70).dimmed()
                );
            }
            LogEvent::VerdictReturned {
                iteration,
                verdict,
                feedback,
            } => {
                let styled = match verdict.as_str() {
                    "PASS" => verdict.bright_green().bold(),
                    "FAIL" => verdict.bright_red().bold(),
                    _ => verdict.bright_yellow().bold(),
                };
                let _ = writeln!(
                    stderr,
                    "  {} {} #{} {} {}",
                    "▶".bright_magenta(),
                    "VERDICT".bright_magenta().bold(),
                    iteration + 1,
                    styled,
                    truncate(feedback, 60).dimmed()
                );
            }
            LogEvent::IterationLimitReached { iterations } => {
                let _ = writeln!(
                    stderr,
                    "  {} Iteration limit reached ({})",
                    "⚠".bright_yellow(),
                    iterations
                );
            }
            LogEvent::PlanCreated { topic, items } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} items for {}",
                    "✓".bright_green(),
                    "PLAN".bright_cyan().bold(),
                    items,
                    truncate(topic, 60)
                );
            }
            LogEvent::WorkerStarted { index, title } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} #{} {}",
                    "▶".bright_cyan(),
                    "WORKER".bright_cyan().bold(),
                    index + 1,
                    title
                );
            }
            LogEvent::WorkerCompleted { index, title } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} #{} {}",
                    "✓".bright_green(),
                    "WORKER".bright_cyan().bold(),
                    index + 1,
                    title
                );
            }
            LogEvent::SelectionMade { title, reason } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} — {}",
                    "★".bright_yellow(),
                    "BEST".bright_yellow().bold(),
                    title,
                    truncate(reason, 60).dimmed()
                );
            }
            LogEvent::ErrorEncountered { stage, error } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} in {}: {}",
                    "✗".bright_red(),
                    "ERROR".bright_red().bold(),
                    stage,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::WorkflowStarted { workflow, .. } => {
                format!("[{}] start:{}", timestamp, workflow)
            }
            LogEvent::ClassificationCompleted {
                is_ticket_booking,
                action,
            } => format!(
                "[{}] classify booking={} action={}",
                timestamp, is_ticket_booking, action
            ),
            LogEvent::RequestDeclined { .. } => format!("[{}] declined", timestamp),
            LogEvent::ExtractionCompleted {
                source,
                destination,
                ..
            } => format!("[{}] extract {}→{}", timestamp, source, destination),
            LogEvent::InputSolicited { .. } => format!("[{}] solicit", timestamp),
            LogEvent::BookingPersisted { ticket_id, action } => {
                format!("[{}] persist:{} {}", timestamp, ticket_id, action)
            }
            LogEvent::ConfirmationGenerated { .. } => format!("[{}] confirm", timestamp),
            LogEvent::HotelBooked { .. } => format!("[{}] hotel", timestamp),
            LogEvent::TripCombined { .. } => format!("[{}] trip:combined", timestamp),
            LogEvent::DraftGenerated { iteration, .. } => {
                format!("[{}] draft:{}", timestamp, iteration + 1)
            }
            LogEvent::VerdictReturned {
                iteration, verdict, ..
            } => format!("[{}] verdict:{} {}", timestamp, iteration + 1, verdict),
            LogEvent::IterationLimitReached { iterations } => {
                format!("[{}] limit:{}", timestamp, iterations)
            }
            LogEvent::PlanCreated { items, .. } => format!("[{}] plan:{}", timestamp, items),
            LogEvent::WorkerStarted { index, .. } => {
                format!("[{}] worker:start:{}", timestamp, index + 1)
            }
            LogEvent::WorkerCompleted { index, .. } => {
                format!("[{}] worker:done:{}", timestamp, index + 1)
            }
            LogEvent::SelectionMade { title, .. } => format!("[{}] best:{}", timestamp, title),
            LogEvent::ErrorEncountered { stage, error } => {
                format!("[{}] error:{}:{}", timestamp, stage, error)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
