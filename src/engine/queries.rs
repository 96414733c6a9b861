use std::collections::BTreeMap;

use crate::model::*;
use crate::queue::BookingQueue;

use super::{Engine, EngineError};

impl Engine {
    pub async fn venue(&self, id: VenueId) -> Option<Venue> {
        self.catalog.read().await.get(id).cloned()
    }

    pub async fn venue_id_by_name(&self, name: &str) -> Option<VenueId> {
        self.catalog.read().await.id_by_name(name)
    }

    /// Every venue, ascending id.
    pub async fn list_venues(&self) -> Vec<Venue> {
        self.catalog.read().await.venues().cloned().collect()
    }

    /// id → venue name, for rendering bookings.
    pub async fn venue_names(&self) -> BTreeMap<VenueId, String> {
        self.catalog.read().await.names()
    }

    pub async fn venue_count(&self) -> usize {
        self.catalog.read().await.len()
    }

    pub async fn filter_venues(&self, query: &VenueQuery) -> VenueSearch {
        self.catalog.read().await.filter(query)
    }

    pub async fn capacity_bounds(&self) -> Result<(u32, u32), EngineError> {
        Ok(self.catalog.read().await.capacity_bounds()?)
    }

    pub async fn kind_list(&self) -> Vec<String> {
        self.catalog.read().await.kind_list()
    }

    pub async fn location_list(&self) -> Vec<String> {
        self.catalog.read().await.location_list()
    }

    /// Slot status of a venue over `window` (or the configured query window),
    /// clamped to the configured window. A window outside it yields an empty
    /// view.
    pub async fn availability(&self, venue_id: VenueId, window: Option<DateWindow>) -> Result<Availability, EngineError> {
        let bounds = self.config.query_window;
        let Some(window) = window.unwrap_or(bounds).clamp_to(&bounds) else {
            return Ok(Availability::default());
        };
        let calendar = self.ledger.calendar(venue_id)?;
        let guard = calendar.read().await;
        Ok(guard.query_range(window))
    }

    /// Free slots of a venue, ascending.
    pub async fn available_slots(&self, venue_id: VenueId) -> Result<Vec<SlotKey>, EngineError> {
        let calendar = self.ledger.calendar(venue_id)?;
        let guard = calendar.read().await;
        Ok(guard.available_slots())
    }

    pub async fn booking_report(&self, venue_id: VenueId) -> Result<BookingQueue, EngineError> {
        let calendar = self.ledger.calendar(venue_id)?;
        let guard = calendar.read().await;
        Ok(guard.booking_report())
    }

    pub fn lookup_booking(&self, booking_id: BookingId) -> Result<Booking, EngineError> {
        self.ledger.lookup(booking_id)
    }

    pub async fn booking_at(&self, venue_id: VenueId, slot: SlotKey) -> Result<Option<Booking>, EngineError> {
        self.ledger.booking_at(venue_id, slot).await
    }

    /// Active bookings of `user`, grouped per venue. Groups are ordered by venue
    /// name, bookings within a group by slot.
    pub async fn bookings_for_user(&self, user: &str) -> Vec<VenueBookings> {
        let mut per_venue: BTreeMap<VenueId, Vec<Booking>> = BTreeMap::new();
        for booking in self.ledger.bookings_of(user) {
            if booking.is_active() {
                per_venue.entry(booking.venue_id).or_default().push(booking);
            }
        }

        let catalog = self.catalog.read().await;
        let mut groups: Vec<VenueBookings> = per_venue
            .into_iter()
            .filter_map(|(venue_id, mut bookings)| {
                let venue = catalog.get(venue_id)?.clone();
                bookings.sort_by_key(|b| b.slot);
                Some(VenueBookings { venue, bookings })
            })
            .collect();
        groups.sort_by(|a, b| a.venue.name.cmp(&b.venue.name));
        groups
    }
}
