use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// First-step classification of a raw user request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookingClassification {
    /// Raw description of the user input
    pub description: String,
    /// Whether this text describes booking a flight or airline ticket
    pub is_ticket_booking: bool,
    /// Whether this is a new booking or a modification of an existing booking
    pub action: BookingAction,
}

/// Routing branch of the booking chain.
///
/// Exhaustive: any other string fails the decode step instead of falling
/// through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    New,
    Modify,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::New => "new",
            BookingAction::Modify => "modify",
        }
    }
}

/// Fields extracted from the request text
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TicketInfo {
    /// Departure location of the flight
    pub source: String,
    /// Destination location of the flight
    pub destination: String,
    /// Departure date of the flight, absent when not mentioned
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    /// Date when the trip ends, absent when not mentioned
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    /// Ticket id, present only when the request names one
    #[serde(default)]
    pub ticket_id: Option<u32>,
}

/// Terminal artifact of the booking chain
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfirmationMessage {
    /// Confirmation message including source, destination, dates and ticket id
    pub confirmation_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotelConfirmation {
    /// Confirmation message for the hotel booking
    pub hotel_confirmation_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CombinedConfirmation {
    /// Confirmation message for the entire trip, flight and hotel together
    pub combined_confirmation_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_parses_known_actions() {
        let parsed: BookingClassification = serde_json::from_str(
            r#"{"description": "book a flight", "is_ticket_booking": true, "action": "new"}"#,
        )
        .unwrap();
        assert_eq!(parsed.action, BookingAction::New);
    }

    #[test]
    fn unknown_action_fails_decode() {
        let result = serde_json::from_str::<BookingClassification>(
            r#"{"description": "cancel it", "is_ticket_booking": true, "action": "cancel"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn ticket_info_dates_default_to_absent() {
        let parsed: TicketInfo =
            serde_json::from_str(r#"{"source": "New York", "destination": "London"}"#).unwrap();
        assert!(parsed.departure_date.is_none());
        assert!(parsed.return_date.is_none());
        assert!(parsed.ticket_id.is_none());
    }
}
