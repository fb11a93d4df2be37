use chrono::NaiveDate;
use promptweave_store::BookingRecord;

use crate::booking::BookingAction;

/// Prompt templates for the booking workflows
pub struct BookingPrompts;

impl BookingPrompts {
    fn today_context(today: NaiveDate) -> String {
        format!("Today is {}.", today.format("%A, %B %d, %Y"))
    }

    /// System turn for the classification gate
    pub fn classification() -> String {
        "Determine if the given text requests booking a flight ticket. \
         Also determine whether it is a new booking or a modification of an \
         existing booking. Return the output as JSON."
            .to_string()
    }

    /// System turn for fresh extraction
    pub fn extraction(today: NaiveDate) -> String {
        format!(
            "{today} Extract ticket information from the user input: source, \
             destination, departure date and return date, as JSON. \
             If no source is mentioned, set it to null. \
             If no destination is mentioned, set it to null. \
             If no return date is mentioned, set it to null. \
             Do not set the departure date or return date unless it is \
             specified in the input. Dates use the YYYY-MM-DD format.",
            today = Self::today_context(today),
        )
    }

    /// System turn for modify-extraction; the persisted record is rendered in
    /// so the model retains fields the request does not change.
    pub fn modification(today: NaiveDate, existing: Option<&BookingRecord>) -> String {
        let existing_context = match existing {
            Some(record) => serde_json::to_string(record).unwrap_or_default(),
            None => "null".to_string(),
        };
        format!(
            "{today} Existing booking info: {existing_context}. \
             Modify the source, destination and dates in the existing booking \
             info based on the new input. Retain the existing values for any \
             attribute the input does not ask to change. \
             Dates use the YYYY-MM-DD format. Return as JSON.",
            today = Self::today_context(today),
        )
    }

    /// System turn for the confirmation message
    pub fn confirmation(action: BookingAction) -> String {
        format!(
            "Generate a friendly confirmation message for a flight ticket \
             booking. Include all relevant details. Write the confirmation \
             message based on the action_type. action_type = {action}. \
             Include the ticket ID in the confirmation message. \
             Return the output as JSON.",
            action = action.as_str(),
        )
    }

    /// User turn for the confirmation message: the persisted details
    pub fn confirmation_details(record: &BookingRecord) -> String {
        serde_json::to_string(record).unwrap_or_default()
    }

    /// System turn for the single-call hotel booking
    pub fn hotel(today: NaiveDate, ticket_id: u32) -> String {
        format!(
            "{today} Ticket ID is {ticket_id}. Based on the user input, \
             extract the destination, departure date and return date. \
             Use the departure date as the check-in date and the return date \
             as the check-out date. The check-out date must be at least one \
             day after the check-in date, and equal to the return date when \
             one is mentioned. Generate a friendly confirmation message for \
             the hotel booking containing the destination, check-in date, \
             check-out date and ticket ID. Return the output as JSON.",
            today = Self::today_context(today),
        )
    }

    /// System turn combining flight and hotel confirmations into one message
    pub fn combined(today: NaiveDate) -> String {
        format!(
            "{today} Generate a friendly confirmation message for the entire \
             trip. Structure it as: a friendly greeting, then the ticket ID, \
             then the flight ticket details (source, destination, departure \
             date, return date), then the hotel booking details (destination, \
             check-in date, check-out date), then a friendly closing remark. \
             Return the output as JSON.",
            today = Self::today_context(today),
        )
    }

    /// User turn carrying both sub-chain confirmations
    pub fn combined_details(flight_message: &str, hotel_message: &str) -> String {
        format!(
            "Flight Booking Confirmation: {flight_message}\nHotel Booking Confirmation: {hotel_message}"
        )
    }
}
