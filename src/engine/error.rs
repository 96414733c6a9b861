use crate::model::{BookingId, SlotKey, VenueId};
use crate::tree::IndexError;

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    EmptyIndex,
    KeyNotFound,
    EmptyQueue,
    NameConflict(String),
    UnknownVenue(VenueId),
    SlotNotAvailable {
        venue_id: VenueId,
        slot: SlotKey,
    },
    SlotNotReserved {
        venue_id: VenueId,
        slot: SlotKey,
    },
    InvalidSlot(SlotKey),
    BookingNotFound(BookingId),
    NotBookingOwner {
        booking_id: BookingId,
        user: String,
    },
    BookingCancelled(BookingId),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::EmptyIndex => write!(f, "index is empty"),
            EngineError::KeyNotFound => write!(f, "key not found in index"),
            EngineError::EmptyQueue => write!(f, "queue is empty"),
            EngineError::NameConflict(name) => write!(f, "venue {name} already exists"),
            EngineError::UnknownVenue(id) => write!(f, "unknown venue: {id}"),
            EngineError::SlotNotAvailable { venue_id, slot } => {
                write!(f, "slot {slot} of venue {venue_id} is not available")
            }
            EngineError::SlotNotReserved { venue_id, slot } => {
                write!(f, "slot {slot} of venue {venue_id} is not reserved")
            }
            EngineError::InvalidSlot(slot) => write!(f, "invalid slot key: {slot}"),
            EngineError::BookingNotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::NotBookingOwner { booking_id, user } => {
                write!(f, "booking {booking_id} does not belong to user {user}")
            }
            EngineError::BookingCancelled(id) => write!(f, "booking {id} is already cancelled"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<IndexError> for EngineError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::EmptyIndex => EngineError::EmptyIndex,
            IndexError::KeyNotFound => EngineError::KeyNotFound,
            IndexError::EmptyQueue => EngineError::EmptyQueue,
        }
    }
}
