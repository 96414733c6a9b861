use std::time::Instant;

use tracing::{debug, info, warn};

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::calendar::Calendar;
use super::{Engine, EngineError};

impl Engine {
    /// Add a venue and provision its calendar. The catalog write lock is held
    /// across the name check, the insert and the provisioning, so two callers
    /// racing with the same name cannot both succeed and no venue is ever
    /// visible without a calendar.
    pub async fn add_venue(&self, venue: NewVenue) -> Result<VenueId, EngineError> {
        let started = Instant::now();
        let mut catalog = self.catalog.write().await;
        let name = venue.name.clone();
        let id = catalog.add_venue(venue)?;

        let start = self.horizon_start();
        let calendar = Calendar::provision(id, start, self.config.horizon_days);
        debug!(venue_id = id, slots = calendar.slot_count(), "calendar provisioned");
        self.ledger.attach_calendar(calendar);

        info!(venue_id = id, name = %name, "venue added");
        metrics::gauge!(observability::VENUES_ACTIVE).set(catalog.len() as f64);
        observability::record_duration("add_venue", started);
        Ok(id)
    }

    /// Reserve one slot for `user`, returning the new booking id.
    pub async fn reserve(&self, venue_id: VenueId, slot: SlotKey, user: &str) -> Result<BookingId, EngineError> {
        let started = Instant::now();
        Self::validate_slot(slot)?;
        validate_user(user)?;

        let booking_id = match self.ledger.reserve(venue_id, slot, user).await {
            Ok(id) => id,
            Err(e) => {
                if matches!(e, EngineError::SlotNotAvailable { .. }) {
                    warn!(venue_id, %slot, user, "reservation conflict");
                    metrics::counter!(observability::RESERVATION_CONFLICTS_TOTAL).increment(1);
                }
                return Err(e);
            }
        };

        info!(venue_id, %slot, booking_id, user, "slot reserved");
        metrics::counter!(observability::BOOKINGS_RESERVED_TOTAL).increment(1);
        observability::record_duration("reserve", started);
        self.notify.send(
            venue_id,
            &CalendarEvent::SlotReserved {
                venue_id,
                slot,
                booking_id,
            },
        );
        Ok(booking_id)
    }

    /// Free a reserved slot. The booking record is kept, marked cancelled.
    pub async fn release(&self, venue_id: VenueId, slot: SlotKey) -> Result<BookingId, EngineError> {
        let started = Instant::now();
        Self::validate_slot(slot)?;
        let booking_id = self.ledger.release(venue_id, slot).await?;

        info!(venue_id, %slot, booking_id, "slot released");
        metrics::counter!(observability::BOOKINGS_RELEASED_TOTAL).increment(1);
        observability::record_duration("release", started);
        self.notify.send(
            venue_id,
            &CalendarEvent::SlotReleased {
                venue_id,
                slot,
                booking_id,
            },
        );
        Ok(booking_id)
    }

    /// Cancel `booking_id` on behalf of its owner.
    pub async fn cancel_booking(&self, booking_id: BookingId, user: &str) -> Result<Booking, EngineError> {
        let started = Instant::now();
        let booking = self.ledger.cancel(booking_id, user).await?;

        info!(booking_id, venue_id = booking.venue_id, slot = %booking.slot, user, "booking cancelled");
        metrics::counter!(observability::BOOKINGS_RELEASED_TOTAL).increment(1);
        observability::record_duration("cancel_booking", started);
        self.notify.send(
            booking.venue_id,
            &CalendarEvent::SlotReleased {
                venue_id: booking.venue_id,
                slot: booking.slot,
                booking_id,
            },
        );
        Ok(booking)
    }
}

fn validate_user(user: &str) -> Result<(), EngineError> {
    if user.is_empty() {
        return Err(EngineError::LimitExceeded("user is empty"));
    }
    if user.len() > MAX_USER_LEN {
        return Err(EngineError::LimitExceeded("user too long"));
    }
    Ok(())
}
