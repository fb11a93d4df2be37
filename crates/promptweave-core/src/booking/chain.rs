use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use promptweave_client::{invoke_structured, ChatModel, StepRequest};
use promptweave_logging::{LogEvent, Logger};
use promptweave_store::{BookingRecord, BookingStore};

use crate::booking::{
    generate_ticket_id, BookingAction, BookingClassification, BookingPrompts, ConfirmationMessage,
    TicketInfo,
};
use crate::{InputSource, WorkflowError};

/// Configuration for one booking chain run
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub model: String,
    /// Injected so the date-context prompts (and tests) are deterministic
    pub today: NaiveDate,
}

/// Terminal outcome of the gated chain
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainOutcome {
    Confirmed {
        ticket_id: u32,
        action: BookingAction,
        message: String,
    },
    /// The classification gate rejected the request; no further calls ran.
    Declined { description: String },
}

impl ChainOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ChainOutcome::Confirmed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ChainOutcome::Confirmed { .. } => 0,
            ChainOutcome::Declined { .. } => 1,
        }
    }
}

/// Gated classify → extract → confirm chain with new/modify routing
pub struct BookingChain<'a> {
    model: &'a dyn ChatModel,
    store: &'a mut BookingStore,
    input: &'a dyn InputSource,
    logger: Arc<Logger>,
    config: ChainConfig,
}

impl<'a> BookingChain<'a> {
    pub fn new(
        model: &'a dyn ChatModel,
        store: &'a mut BookingStore,
        input: &'a dyn InputSource,
        logger: Arc<Logger>,
        config: ChainConfig,
    ) -> Self {
        Self {
            model,
            store,
            input,
            logger,
            config,
        }
    }

    /// Run the chain, generating a fresh ticket id for a new booking.
    pub async fn run(&mut self, user_input: &str) -> Result<ChainOutcome, WorkflowError> {
        self.run_with_ticket(user_input, None).await
    }

    /// Run the chain with a preassigned ticket id (the trip workflow shares
    /// one id between the flight and hotel legs).
    pub async fn run_with_ticket(
        &mut self,
        user_input: &str,
        preassigned: Option<u32>,
    ) -> Result<ChainOutcome, WorkflowError> {
        self.logger.log(&LogEvent::WorkflowStarted {
            workflow: "booking".to_string(),
            input: user_input.to_string(),
        });

        let classification: BookingClassification = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: BookingPrompts::classification(),
                user: Some(user_input.to_string()),
                temperature: 0.0,
            },
        )
        .await?;

        self.logger.log(&LogEvent::ClassificationCompleted {
            is_ticket_booking: classification.is_ticket_booking,
            action: classification.action.as_str().to_string(),
        });

        // Gate: anything that is not a booking request stops here.
        if !classification.is_ticket_booking {
            self.logger.log(&LogEvent::RequestDeclined {
                description: "Sorry, I cannot help you with this request".to_string(),
            });
            return Ok(ChainOutcome::Declined {
                description: classification.description,
            });
        }

        let action = classification.action;
        let (info, ticket_id) = match action {
            BookingAction::New => {
                let info = self.extract_with_retry(user_input).await?;
                let ticket_id = preassigned.unwrap_or_else(generate_ticket_id);
                (info, ticket_id)
            }
            BookingAction::Modify => {
                let ticket_id = match preassigned {
                    Some(id) => id,
                    None => self.solicit_ticket_id()?,
                };
                let info = self.extract_modification(user_input, ticket_id).await?;
                (info, ticket_id)
            }
        };

        let departure_date = info
            .departure_date
            .ok_or(WorkflowError::MissingDepartureDate)?;

        let record = BookingRecord {
            source: info.source,
            destination: info.destination,
            departure_date: departure_date.format("%B %d, %Y").to_string(),
            return_date: info.return_date.map(|d| d.format("%B %d, %Y").to_string()),
            ticket_id,
        };

        // Read-merge-write happens before the confirmation call.
        self.store.upsert(record.clone())?;
        self.logger.log(&LogEvent::BookingPersisted {
            ticket_id,
            action: action.as_str().to_string(),
        });

        let confirmation: ConfirmationMessage = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: BookingPrompts::confirmation(action),
                user: Some(BookingPrompts::confirmation_details(&record)),
                temperature: 0.0,
            },
        )
        .await?;

        self.logger.log(&LogEvent::ConfirmationGenerated {
            message: confirmation.confirmation_message.clone(),
        });

        Ok(ChainOutcome::Confirmed {
            ticket_id,
            action,
            message: confirmation.confirmation_message,
        })
    }

    async fn extract(&self, user_input: &str) -> Result<TicketInfo, WorkflowError> {
        let info: TicketInfo = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: BookingPrompts::extraction(self.config.today),
                user: Some(user_input.to_string()),
                temperature: 0.0,
            },
        )
        .await?;

        self.logger.log(&LogEvent::ExtractionCompleted {
            source: info.source.clone(),
            destination: info.destination.clone(),
            departure_date: info.departure_date.map(|d| d.to_string()),
            return_date: info.return_date.map(|d| d.to_string()),
        });
        Ok(info)
    }

    /// Extract; when the departure date is absent, solicit one extra line and
    /// re-extract exactly once.
    async fn extract_with_retry(&self, user_input: &str) -> Result<TicketInfo, WorkflowError> {
        let info = self.extract(user_input).await?;
        if info.departure_date.is_some() {
            return Ok(info);
        }

        let prompt = "Please enter the departure date: ";
        self.logger.log(&LogEvent::InputSolicited {
            prompt: prompt.to_string(),
        });
        let line = self.input.request_line(prompt)?;

        let enriched = format!("{} and the departure date is {}", user_input, line.trim());
        debug!(input = %enriched, "Re-running extraction with solicited date");

        let info = self.extract(&enriched).await?;
        if info.departure_date.is_none() {
            return Err(WorkflowError::MissingDepartureDate);
        }
        Ok(info)
    }

    async fn extract_modification(
        &self,
        user_input: &str,
        ticket_id: u32,
    ) -> Result<TicketInfo, WorkflowError> {
        let existing = self.store.get(ticket_id);
        let info: TicketInfo = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: BookingPrompts::modification(self.config.today, existing),
                user: Some(user_input.to_string()),
                temperature: 0.0,
            },
        )
        .await?;

        self.logger.log(&LogEvent::ExtractionCompleted {
            source: info.source.clone(),
            destination: info.destination.clone(),
            departure_date: info.departure_date.map(|d| d.to_string()),
            return_date: info.return_date.map(|d| d.to_string()),
        });
        Ok(info)
    }

    fn solicit_ticket_id(&self) -> Result<u32, WorkflowError> {
        let prompt = "Please enter the ticket ID: ";
        self.logger.log(&LogEvent::InputSolicited {
            prompt: prompt.to_string(),
        });
        let line = self.input.request_line(prompt)?;
        line.trim()
            .parse()
            .map_err(|_| WorkflowError::InvalidTicketId(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptweave_logging::LogFormat;
    use promptweave_store::BOOKING_STORE_FILE;
    use tempfile::tempdir;

    use crate::testing::{QueuedInput, ScriptedModel};

    const USER_INPUT: &str =
        "I want to book a flight ticket from New York to London on Mar 10 and return on Mar 25";

    fn config() -> ChainConfig {
        ChainConfig {
            model: "phi4".to_string(),
            today: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    fn logger() -> Arc<Logger> {
        Arc::new(Logger::new(LogFormat::Compact))
    }

    fn open_store(dir: &tempfile::TempDir) -> BookingStore {
        BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap()
    }

    const CLASSIFY_NEW: &str =
        r#"{"description": "flight booking", "is_ticket_booking": true, "action": "new"}"#;
    const CLASSIFY_NOT_BOOKING: &str =
        r#"{"description": "pizza order", "is_ticket_booking": false, "action": "new"}"#;
    const CLASSIFY_MODIFY: &str =
        r#"{"description": "change booking", "is_ticket_booking": true, "action": "modify"}"#;
    const EXTRACT_FULL: &str = r#"{"source": "New York", "destination": "London",
        "departure_date": "2026-03-10", "return_date": "2026-03-25", "ticket_id": null}"#;
    const EXTRACT_NO_DATE: &str = r#"{"source": "New York", "destination": "London",
        "departure_date": null, "return_date": null, "ticket_id": null}"#;
    const CONFIRM: &str = r#"{"confirmation_message": "Your flight is booked!"}"#;

    #[tokio::test]
    async fn non_booking_request_stops_at_the_gate() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        let model = ScriptedModel::new([CLASSIFY_NOT_BOOKING]);
        let input = QueuedInput::empty();

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let outcome = chain.run("Order me a pizza").await.unwrap();

        assert!(matches!(outcome, ChainOutcome::Declined { .. }));
        assert_eq!(model.request_count(), 1);
        assert_eq!(input.served(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn new_booking_with_date_runs_straight_through() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        let model = ScriptedModel::new([CLASSIFY_NEW, EXTRACT_FULL, CONFIRM]);
        let input = QueuedInput::empty();

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let outcome = chain.run(USER_INPUT).await.unwrap();

        // One extraction, no solicitation, one confirmation.
        assert_eq!(model.request_count(), 3);
        assert_eq!(input.served(), 0);

        let ChainOutcome::Confirmed {
            ticket_id, action, ..
        } = outcome
        else {
            panic!("expected a confirmed booking");
        };
        assert_eq!(action, BookingAction::New);

        let persisted = store.get(ticket_id).unwrap();
        assert_eq!(persisted.departure_date, "March 10, 2026");
        assert_eq!(persisted.return_date.as_deref(), Some("March 25, 2026"));

        // The confirmation call renders both cities and the ticket id.
        let confirm_request = model.request(2);
        let details = &confirm_request.messages[1].content;
        assert!(details.contains("New York"));
        assert!(details.contains("London"));
        assert!(details.contains(&ticket_id.to_string()));
    }

    #[tokio::test]
    async fn missing_date_solicits_exactly_once() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        let model = ScriptedModel::new([CLASSIFY_NEW, EXTRACT_NO_DATE, EXTRACT_FULL, CONFIRM]);
        let input = QueuedInput::new(["March 10"]);

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let outcome = chain
            .run("I want to book a flight ticket from New York to London")
            .await
            .unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(input.served(), 1);
        assert_eq!(model.request_count(), 4);

        // The re-extraction sees the original input plus the solicited date.
        let retry_request = model.request(2);
        let user_turn = &retry_request.messages[1].content;
        assert!(user_turn.contains("New York to London"));
        assert!(user_turn.contains("and the departure date is March 10"));
    }

    #[tokio::test]
    async fn date_still_missing_after_retry_is_an_error() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        let model = ScriptedModel::new([CLASSIFY_NEW, EXTRACT_NO_DATE, EXTRACT_NO_DATE]);
        let input = QueuedInput::new(["whenever"]);

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let err = chain.run("Book me a flight to London").await.unwrap_err();

        assert!(matches!(err, WorkflowError::MissingDepartureDate));
        assert_eq!(input.served(), 1);
    }

    #[tokio::test]
    async fn modification_merges_onto_persisted_record() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        store
            .upsert(BookingRecord {
                source: "New York".to_string(),
                destination: "Delhi".to_string(),
                departure_date: "March 10, 2026".to_string(),
                return_date: Some("March 25, 2026".to_string()),
                ticket_id: 60569,
            })
            .unwrap();

        let modified_extract = r#"{"source": "New York", "destination": "Delhi",
            "departure_date": "2026-03-18", "return_date": null, "ticket_id": 60569}"#;
        let model = ScriptedModel::new([CLASSIFY_MODIFY, modified_extract, CONFIRM]);
        let input = QueuedInput::new(["60569"]);

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let outcome = chain
            .run("Modify the ticket by changing the departure date to March 18th")
            .await
            .unwrap();

        let ChainOutcome::Confirmed {
            ticket_id, action, ..
        } = outcome
        else {
            panic!("expected a confirmed modification");
        };
        assert_eq!(ticket_id, 60569);
        assert_eq!(action, BookingAction::Modify);

        // The modify-extraction is given the persisted record as context.
        let modify_request = model.request(1);
        assert!(modify_request.messages[0].content.contains("Delhi"));
        assert!(modify_request.messages[0].content.contains("60569"));

        // Departure date replaced, untouched fields retained.
        let merged = store.get(60569).unwrap();
        assert_eq!(merged.departure_date, "March 18, 2026");
        assert_eq!(merged.return_date.as_deref(), Some("March 25, 2026"));
        assert_eq!(merged.destination, "Delhi");
    }

    #[tokio::test]
    async fn non_numeric_ticket_id_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = open_store(&dir);
        let model = ScriptedModel::new([CLASSIFY_MODIFY]);
        let input = QueuedInput::new(["not-a-number"]);

        let mut chain = BookingChain::new(&model, &mut store, &input, logger(), config());
        let err = chain.run("Change my booking").await.unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidTicketId(_)));
    }
}
