//! Flight-booking workflows: the gated chain and the concurrent trip.

mod chain;
mod contracts;
mod prompts;
mod trip;

pub use chain::{BookingChain, ChainConfig, ChainOutcome};
pub use contracts::{
    BookingAction, BookingClassification, CombinedConfirmation, ConfirmationMessage,
    HotelConfirmation, TicketInfo,
};
pub use prompts::BookingPrompts;
pub use trip::{book_trip, TripConfig, TripOutcome};

use rand::Rng;

/// 5-digit ticket id for a new booking
pub(crate) fn generate_ticket_id() -> u32 {
    rand::thread_rng().gen_range(10_000..=99_999)
}
