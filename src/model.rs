use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::limits::{MATCH_ALL, MAX_DATE, MIN_DATE, PERIODS_PER_DAY};

pub type VenueId = u32;
pub type BookingId = u64;

/// Calendar date encoded as `YYMMDD` (two-digit year, 2000–2099).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(pub u32);

impl DateKey {
    /// Encode `date`; years outside 2000–2099 fold onto the two-digit range,
    /// so use [`DateKey::checked_from_date`] where order matters.
    pub fn from_date(date: NaiveDate) -> Self {
        let yy = date.year().rem_euclid(100) as u32;
        Self(yy * 10_000 + date.month() * 100 + date.day())
    }

    /// `None` for dates outside 2000-01-01..=2099-12-31.
    pub fn checked_from_date(date: NaiveDate) -> Option<Self> {
        (2000..=2099)
            .contains(&date.year())
            .then(|| Self::from_date(date))
    }

    /// In `[MIN_DATE, MAX_DATE]` and naming a real day.
    pub fn is_valid(&self) -> bool {
        (MIN_DATE..=MAX_DATE).contains(&self.0) && self.to_date().is_some()
    }

    pub fn year(&self) -> u32 {
        self.0 / 10_000
    }

    pub fn month(&self) -> u32 {
        self.0 / 100 % 100
    }

    pub fn day(&self) -> u32 {
        self.0 % 100
    }

    /// `None` for keys that do not name a real day (e.g. `240230`).
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2000 + self.year() as i32, self.month(), self.day())
    }

    /// Lowest slot key of this date (period digit 0, never live).
    pub fn first_slot(&self) -> SlotKey {
        SlotKey(self.0.saturating_mul(10))
    }

    /// Highest slot key of this date.
    pub fn last_slot(&self) -> SlotKey {
        SlotKey(self.0.saturating_mul(10).saturating_add(Period::Evening as u32))
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Intraday booking period; its discriminant is the last digit of a slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    Morning = 1,
    Afternoon = 2,
    Evening = 3,
}

impl Period {
    pub const ALL: [Period; PERIODS_PER_DAY as usize] = [Period::Morning, Period::Afternoon, Period::Evening];

    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            1 => Some(Period::Morning),
            2 => Some(Period::Afternoon),
            3 => Some(Period::Evening),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Period::Morning => "Morning",
            Period::Afternoon => "Afternoon",
            Period::Evening => "Evening",
        }
    }
}

/// Bookable slot encoded as `date * 10 + period`, so numeric order is
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(pub u32);

impl SlotKey {
    pub fn new(date: DateKey, period: Period) -> Self {
        Self(date.0 * 10 + period as u32)
    }

    pub fn date(&self) -> DateKey {
        DateKey(self.0 / 10)
    }

    /// `None` for the sentinel digit 0 or anything above 3.
    pub fn period(&self) -> Option<Period> {
        Period::from_digit(self.0 % 10)
    }

    /// A key is valid if its period digit is live and its date is a real day.
    pub fn is_valid(&self) -> bool {
        self.period().is_some() && self.date().is_valid()
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:07}", self.0)
    }
}

// ── Venues ──────────────────────────────────────────────────────

/// Venue attributes as submitted by the boundary, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub kind: String,
    pub location: String,
    pub capacity: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub kind: String,
    pub location: String,
    pub capacity: u32,
    pub description: String,
}

impl Venue {
    pub fn from_new(id: VenueId, v: NewVenue) -> Self {
        Self {
            id,
            name: v.name,
            kind: v.kind,
            location: v.location,
            capacity: v.capacity,
            description: v.description,
        }
    }
}

/// A categorical filter: a concrete category or match-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    Any,
    Exactly(String),
}

impl CategoryFilter {
    /// Map a boundary form value; the `"All"` sentinel means match-all.
    pub fn parse(value: &str) -> Self {
        if value == MATCH_ALL {
            CategoryFilter::Any
        } else {
            CategoryFilter::Exactly(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueQuery {
    pub location: CategoryFilter,
    pub kind: CategoryFilter,
    /// Inclusive capacity bounds.
    pub cap_min: u32,
    pub cap_max: u32,
}

impl VenueQuery {
    pub fn any() -> Self {
        Self {
            location: CategoryFilter::Any,
            kind: CategoryFilter::Any,
            cap_min: 0,
            cap_max: u32::MAX,
        }
    }
}

/// Result of a catalog filter: matching venues plus their deterministic order
/// (ascending id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSearch {
    pub venues: Vec<Venue>,
    pub order: Vec<VenueId>,
}

// ── Bookings ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Active,
    /// Slot released; the record is kept so the id still resolves.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user: String,
    pub venue_id: VenueId,
    pub slot: SlotKey,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

/// A user's active bookings at one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueBookings {
    pub venue: Venue,
    pub bookings: Vec<Booking>,
}

// ── Availability ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Unavailable,
}

/// Inclusive `[min, max]` window of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub min: DateKey,
    pub max: DateKey,
}

impl DateWindow {
    pub fn new(min: DateKey, max: DateKey) -> Self {
        Self { min, max }
    }

    /// Intersection of two windows; `None` when they do not overlap.
    pub fn clamp_to(&self, bounds: &DateWindow) -> Option<DateWindow> {
        let min = self.min.max(bounds.min);
        let max = self.max.min(bounds.max);
        (min <= max).then_some(DateWindow { min, max })
    }
}

/// Per-venue view of a date window: `date -> period -> status`, plus the
/// in-horizon dates of the window in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub slots: std::collections::BTreeMap<DateKey, std::collections::BTreeMap<Period, SlotStatus>>,
    pub dates: Vec<DateKey>,
}

impl Availability {
    pub fn status(&self, slot: SlotKey) -> Option<SlotStatus> {
        let period = slot.period()?;
        self.slots.get(&slot.date())?.get(&period).copied()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.values().map(|p| p.len()).sum()
    }

    pub fn count(&self, status: SlotStatus) -> usize {
        self.slots
            .values()
            .flat_map(|p| p.values())
            .filter(|s| **s == status)
            .count()
    }
}

/// Change feed payload, broadcast per venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarEvent {
    SlotReserved {
        venue_id: VenueId,
        slot: SlotKey,
        booking_id: BookingId,
    },
    SlotReleased {
        venue_id: VenueId,
        slot: SlotKey,
        booking_id: BookingId,
    },
}
