use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::model::*;

use super::EngineError;
use super::calendar::Calendar;

pub type SharedCalendar = Arc<RwLock<Calendar>>;

/// Owns every venue's calendar and the booking records. All slot reservations
/// and releases go through here, under the target calendar's write lock.
pub struct BookingLedger {
    calendars: DashMap<VenueId, SharedCalendar>,
    bookings: DashMap<BookingId, Booking>,
    /// user → booking ids, in booking order.
    by_user: DashMap<String, Vec<BookingId>>,
    /// Last assigned booking id; ids are never reused.
    last_id: AtomicU64,
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            calendars: DashMap::new(),
            bookings: DashMap::new(),
            by_user: DashMap::new(),
            last_id: AtomicU64::new(0),
        }
    }

    // ── Calendars ────────────────────────────────────────────────

    pub fn attach_calendar(&self, calendar: Calendar) {
        self.calendars
            .insert(calendar.venue_id(), Arc::new(RwLock::new(calendar)));
    }

    pub fn calendar(&self, venue_id: VenueId) -> Result<SharedCalendar, EngineError> {
        self.calendars
            .get(&venue_id)
            .map(|e| e.value().clone())
            .ok_or(EngineError::UnknownVenue(venue_id))
    }

    pub fn calendar_count(&self) -> usize {
        self.calendars.len()
    }

    // ── Reservations ─────────────────────────────────────────────

    /// Reserve `slot` at `venue_id` for `user`. The availability check, id
    /// allocation and calendar update happen under one write lock, so of two
    /// racing callers exactly one wins and the other sees `SlotNotAvailable`.
    pub async fn reserve(&self, venue_id: VenueId, slot: SlotKey, user: &str) -> Result<BookingId, EngineError> {
        let calendar = self.calendar(venue_id)?;
        let mut guard = calendar.write().await;
        if !guard.is_available(slot) {
            return Err(EngineError::SlotNotAvailable { venue_id, slot });
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        guard.reserve(slot, id)?;
        self.bookings.insert(
            id,
            Booking {
                id,
                user: user.to_string(),
                venue_id,
                slot,
                status: BookingStatus::Active,
            },
        );
        self.by_user.entry(user.to_string()).or_default().push(id);
        Ok(id)
    }

    /// Free `slot` at `venue_id`. The booking that held it stays in the ledger,
    /// marked cancelled. Returns that booking's id.
    pub async fn release(&self, venue_id: VenueId, slot: SlotKey) -> Result<BookingId, EngineError> {
        let calendar = self.calendar(venue_id)?;
        let mut guard = calendar.write().await;
        let id = guard.release(slot)?;
        if let Some(mut booking) = self.bookings.get_mut(&id) {
            booking.status = BookingStatus::Cancelled;
        }
        Ok(id)
    }

    /// Cancel a booking on behalf of `user`, who must own it.
    pub async fn cancel(&self, booking_id: BookingId, user: &str) -> Result<Booking, EngineError> {
        let booking = self.lookup(booking_id)?;
        if booking.user != user {
            return Err(EngineError::NotBookingOwner {
                booking_id,
                user: user.to_string(),
            });
        }
        if !booking.is_active() {
            return Err(EngineError::BookingCancelled(booking_id));
        }

        let calendar = self.calendar(booking.venue_id)?;
        let mut guard = calendar.write().await;
        // Re-check under the lock: a concurrent release may have won.
        if guard.booking_at(booking.slot) != Some(booking_id) {
            return Err(EngineError::BookingCancelled(booking_id));
        }
        guard.release(booking.slot)?;
        let mut entry = self
            .bookings
            .get_mut(&booking_id)
            .ok_or(EngineError::BookingNotFound(booking_id))?;
        entry.status = BookingStatus::Cancelled;
        Ok(entry.value().clone())
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn lookup(&self, booking_id: BookingId) -> Result<Booking, EngineError> {
        self.bookings
            .get(&booking_id)
            .map(|e| e.value().clone())
            .ok_or(EngineError::BookingNotFound(booking_id))
    }

    /// Booking currently holding `slot` at `venue_id`, if any.
    pub async fn booking_at(&self, venue_id: VenueId, slot: SlotKey) -> Result<Option<Booking>, EngineError> {
        let calendar = self.calendar(venue_id)?;
        let id = calendar.read().await.booking_at(slot);
        Ok(id.and_then(|id| self.bookings.get(&id).map(|e| e.value().clone())))
    }

    /// Every booking `user` ever made, cancelled ones included, in id order.
    pub fn bookings_of(&self, user: &str) -> Vec<Booking> {
        let ids = self
            .by_user
            .get(user)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        ids.iter()
            .filter_map(|id| self.bookings.get(id).map(|e| e.value().clone()))
            .collect()
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }
}
