mod calendar;
mod catalog;
mod error;
mod ledger;
mod mutations;
mod queries;

pub use calendar::Calendar;
pub use catalog::VenueCatalog;
pub use error::EngineError;
pub use ledger::{BookingLedger, SharedCalendar};

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::config::EngineConfig;
use crate::model::*;
use crate::notify::NotifyHub;

/// The booking model: venue catalog, per-venue calendars and the booking
/// ledger. Construct one per process (or per test) and share it by `Arc`.
pub struct Engine {
    pub(super) config: EngineConfig,
    /// One lock for the whole catalog; venue creation is rare.
    pub(super) catalog: RwLock<VenueCatalog>,
    pub ledger: BookingLedger,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(config: EngineConfig, notify: Arc<NotifyHub>) -> Self {
        Self {
            config,
            catalog: RwLock::new(VenueCatalog::new()),
            ledger: BookingLedger::new(),
            notify,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// First day of a horizon provisioned now.
    pub(super) fn horizon_start(&self) -> NaiveDate {
        self.config
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Reject slot keys with a dead period digit or an impossible date.
    pub(super) fn validate_slot(slot: SlotKey) -> Result<(), EngineError> {
        if slot.is_valid() {
            Ok(())
        } else {
            Err(EngineError::InvalidSlot(slot))
        }
    }
}
