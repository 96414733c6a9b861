use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::limits::REPORT_PRIORITY;
use crate::model::*;
use crate::queue::BookingQueue;
use crate::tree::OrderedIndex;

use super::EngineError;

/// Slot state of one venue: every slot in the horizon sits in exactly one of
/// `available` / `unavailable`. `dates` lists the horizon's days.
#[derive(Debug, Clone)]
pub struct Calendar {
    venue_id: VenueId,
    available: OrderedIndex<SlotKey>,
    /// Reserved slots, satellite = owning booking.
    unavailable: OrderedIndex<SlotKey, BookingId>,
    dates: OrderedIndex<DateKey>,
}

impl Calendar {
    /// Build the calendar of a new venue with `horizon_days` days of slots
    /// starting at `start`. A calendar is initialized exactly once, here.
    pub fn provision(venue_id: VenueId, start: NaiveDate, horizon_days: u32) -> Self {
        let mut calendar = Self {
            venue_id,
            available: OrderedIndex::new(),
            unavailable: OrderedIndex::new(),
            dates: OrderedIndex::new(),
        };
        calendar.initialize(start, horizon_days);
        calendar
    }

    /// Days outside 2000–2099 have no key that sorts chronologically with the
    /// rest, so the horizon is cut at the century bounds.
    fn initialize(&mut self, start: NaiveDate, horizon_days: u32) {
        for offset in 0..horizon_days {
            let Some(day) = start.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let Some(date) = DateKey::checked_from_date(day) else {
                if day.year() > 2099 {
                    break;
                }
                continue;
            };
            for period in Period::ALL {
                self.available.insert(SlotKey::new(date, period), ());
            }
            self.dates.insert(date, ());
        }
    }

    pub fn venue_id(&self) -> VenueId {
        self.venue_id
    }

    /// Move `slot` from available to reserved under `booking_id`.
    pub fn reserve(&mut self, slot: SlotKey, booking_id: BookingId) -> Result<(), EngineError> {
        if !self.available.delete(&slot) {
            return Err(EngineError::SlotNotAvailable {
                venue_id: self.venue_id,
                slot,
            });
        }
        self.unavailable.insert(slot, booking_id);
        Ok(())
    }

    /// Move `slot` back to available, returning the booking that held it.
    pub fn release(&mut self, slot: SlotKey) -> Result<BookingId, EngineError> {
        let booking_id = self
            .unavailable
            .remove(&slot)
            .ok_or(EngineError::SlotNotReserved {
                venue_id: self.venue_id,
                slot,
            })?;
        self.available.insert(slot, ());
        Ok(booking_id)
    }

    pub fn is_available(&self, slot: SlotKey) -> bool {
        self.available.contains(&slot)
    }

    pub fn status(&self, slot: SlotKey) -> Option<SlotStatus> {
        if self.available.contains(&slot) {
            Some(SlotStatus::Available)
        } else if self.unavailable.contains(&slot) {
            Some(SlotStatus::Unavailable)
        } else {
            None
        }
    }

    pub fn booking_at(&self, slot: SlotKey) -> Option<BookingId> {
        self.unavailable.get(&slot).copied()
    }

    pub fn available_slots(&self) -> Vec<SlotKey> {
        self.available.flatten()
    }

    pub fn dates(&self) -> Vec<DateKey> {
        self.dates.flatten()
    }

    /// Total slots in the horizon, free or not.
    pub fn slot_count(&self) -> usize {
        self.available.len() + self.unavailable.len()
    }

    /// Status of every slot whose date falls in `window`, plus the in-window
    /// horizon dates.
    pub fn query_range(&self, window: DateWindow) -> Availability {
        let dates: Vec<DateKey> = self
            .dates
            .range(window.min, window.max)
            .map(|(d, _)| d)
            .collect();
        let (lo, hi) = (window.min.first_slot(), window.max.last_slot());

        let mut slots: BTreeMap<DateKey, BTreeMap<Period, SlotStatus>> = BTreeMap::new();
        for (slot, _) in self.available.range(lo, hi) {
            if let Some(period) = slot.period() {
                slots
                    .entry(slot.date())
                    .or_default()
                    .insert(period, SlotStatus::Available);
            }
        }
        // Reserved entries go second; a slot already marked available here
        // means the two indices overlap, which must never happen.
        for (slot, _) in self.unavailable.range(lo, hi) {
            if let Some(period) = slot.period() {
                let previous = slots
                    .entry(slot.date())
                    .or_default()
                    .insert(period, SlotStatus::Unavailable);
                assert!(
                    previous.is_none(),
                    "slot {slot} of venue {} is both available and reserved",
                    self.venue_id
                );
            }
        }
        Availability { slots, dates }
    }

    /// Reserved slots with their bookings, queued in slot order at the report
    /// priority.
    pub fn booking_report(&self) -> BookingQueue {
        let (slots, bookings) = self.unavailable.flatten_with_satellites();
        let mut queue = BookingQueue::new();
        for (slot, booking_id) in slots.into_iter().zip(bookings) {
            queue.enqueue(slot, booking_id, REPORT_PRIORITY);
        }
        queue
    }

    #[cfg(test)]
    pub(crate) fn assert_partition(&self) {
        self.available.assert_invariants();
        self.unavailable.assert_invariants();
        for slot in self.available.flatten() {
            assert!(!self.unavailable.contains(&slot), "slot {slot} in both indices");
        }
        for day in self.dates.flatten() {
            for period in Period::ALL {
                let slot = SlotKey::new(day, period);
                assert!(
                    self.available.contains(&slot) ^ self.unavailable.contains(&slot),
                    "slot {slot} in neither or both indices"
                );
            }
        }
    }
}
