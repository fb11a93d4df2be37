use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use promptweave_client::{invoke_structured, ChatModel, StepRequest};
use promptweave_logging::{LogEvent, Logger};
use promptweave_store::BookingStore;

use crate::booking::{
    generate_ticket_id, BookingChain, BookingPrompts, ChainConfig, ChainOutcome,
    CombinedConfirmation, HotelConfirmation,
};
use crate::{InputSource, WorkflowError};

/// Configuration for the concurrent trip workflow
#[derive(Debug, Clone)]
pub struct TripConfig {
    pub model: String,
    pub today: NaiveDate,
}

/// Outcome of the combined flight + hotel workflow
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TripOutcome {
    Booked {
        ticket_id: u32,
        flight_message: String,
        hotel_message: String,
        combined_message: String,
    },
    /// The flight sub-chain declined; the combined confirmation is skipped.
    FlightDeclined {
        description: String,
        hotel_message: String,
    },
}

impl TripOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            TripOutcome::Booked { .. } => 0,
            TripOutcome::FlightDeclined { .. } => 1,
        }
    }
}

/// Book a flight and a hotel concurrently, then combine the confirmations.
///
/// The two sub-chains share only the preassigned ticket id; the booking
/// store is written by the flight leg alone.
pub async fn book_trip(
    model: &dyn ChatModel,
    store: &mut BookingStore,
    input: &dyn InputSource,
    logger: Arc<Logger>,
    config: &TripConfig,
    user_input: &str,
) -> Result<TripOutcome, WorkflowError> {
    logger.log(&LogEvent::WorkflowStarted {
        workflow: "trip".to_string(),
        input: user_input.to_string(),
    });

    let ticket_id = generate_ticket_id();

    let chain_config = ChainConfig {
        model: config.model.clone(),
        today: config.today,
    };
    let mut chain = BookingChain::new(model, store, input, logger.clone(), chain_config);

    let (flight, hotel) = tokio::join!(
        chain.run_with_ticket(user_input, Some(ticket_id)),
        book_hotel(model, config, ticket_id, user_input),
    );
    let flight = flight?;
    let hotel = hotel?;

    logger.log(&LogEvent::HotelBooked {
        message: hotel.hotel_confirmation_message.clone(),
    });

    match flight {
        ChainOutcome::Confirmed {
            ticket_id, message, ..
        } => {
            let combined: CombinedConfirmation = invoke_structured(
                model,
                StepRequest {
                    model: &config.model,
                    system: BookingPrompts::combined(config.today),
                    user: Some(BookingPrompts::combined_details(
                        &message,
                        &hotel.hotel_confirmation_message,
                    )),
                    temperature: 0.0,
                },
            )
            .await?;

            logger.log(&LogEvent::TripCombined {
                message: combined.combined_confirmation_message.clone(),
            });

            Ok(TripOutcome::Booked {
                ticket_id,
                flight_message: message,
                hotel_message: hotel.hotel_confirmation_message,
                combined_message: combined.combined_confirmation_message,
            })
        }
        ChainOutcome::Declined { description } => Ok(TripOutcome::FlightDeclined {
            description,
            hotel_message: hotel.hotel_confirmation_message,
        }),
    }
}

async fn book_hotel(
    model: &dyn ChatModel,
    config: &TripConfig,
    ticket_id: u32,
    user_input: &str,
) -> Result<HotelConfirmation, WorkflowError> {
    let confirmation = invoke_structured(
        model,
        StepRequest {
            model: &config.model,
            system: BookingPrompts::hotel(config.today, ticket_id),
            user: Some(user_input.to_string()),
            temperature: 0.0,
        },
    )
    .await?;
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptweave_logging::LogFormat;
    use promptweave_store::BOOKING_STORE_FILE;
    use tempfile::tempdir;

    use crate::testing::{KeyedModel, QueuedInput};

    const USER_INPUT: &str =
        "I want to book a flight ticket from New York to London on Mar 10 and return on Mar 25";

    fn config() -> TripConfig {
        TripConfig {
            model: "phi4".to_string(),
            today: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    fn keyed_model(classification: &'static str) -> KeyedModel {
        KeyedModel::new(vec![
            ("requests booking a flight ticket", classification),
            (
                "Extract ticket information",
                r#"{"source": "New York", "destination": "London",
                    "departure_date": "2026-03-10", "return_date": "2026-03-25"}"#,
            ),
            (
                "confirmation message for a flight ticket booking",
                r#"{"confirmation_message": "Flight booked from New York to London"}"#,
            ),
            (
                "Ticket ID is",
                r#"{"hotel_confirmation_message": "Hotel booked in London"}"#,
            ),
            (
                "entire trip",
                r#"{"combined_confirmation_message": "Your whole trip is booked"}"#,
            ),
        ])
    }

    #[tokio::test]
    async fn books_flight_and_hotel_then_combines() {
        let dir = tempdir().unwrap();
        let mut store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();
        let model = keyed_model(
            r#"{"description": "flight booking", "is_ticket_booking": true, "action": "new"}"#,
        );
        let input = QueuedInput::empty();
        let logger = Arc::new(Logger::new(LogFormat::Compact));

        let outcome = book_trip(&model, &mut store, &input, logger, &config(), USER_INPUT)
            .await
            .unwrap();

        let TripOutcome::Booked {
            ticket_id,
            flight_message,
            hotel_message,
            combined_message,
        } = outcome
        else {
            panic!("expected a fully booked trip");
        };
        assert_eq!(flight_message, "Flight booked from New York to London");
        assert_eq!(hotel_message, "Hotel booked in London");
        assert_eq!(combined_message, "Your whole trip is booked");

        // The flight leg is the only writer of the store.
        assert_eq!(store.len(), 1);
        assert!(store.get(ticket_id).is_some());

        // The combined step sees both sub-chain confirmations.
        let requests = model.requests();
        let combined_request = requests
            .iter()
            .find(|r| r.messages[0].content.contains("entire trip"))
            .unwrap();
        let details = &combined_request.messages[1].content;
        assert!(details.contains("Flight booked from New York to London"));
        assert!(details.contains("Hotel booked in London"));
    }

    #[tokio::test]
    async fn declined_flight_skips_the_combined_step() {
        let dir = tempdir().unwrap();
        let mut store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();
        let model = keyed_model(
            r#"{"description": "pizza order", "is_ticket_booking": false, "action": "new"}"#,
        );
        let input = QueuedInput::empty();
        let logger = Arc::new(Logger::new(LogFormat::Compact));

        let outcome = book_trip(&model, &mut store, &input, logger, &config(), "Order a pizza")
            .await
            .unwrap();

        assert!(matches!(outcome, TripOutcome::FlightDeclined { .. }));
        assert!(store.is_empty());
        assert!(!model
            .requests()
            .iter()
            .any(|r| r.messages[0].content.contains("entire trip")));
    }
}
