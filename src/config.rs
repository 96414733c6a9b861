use chrono::NaiveDate;

use crate::limits::*;
use crate::model::{DateKey, DateWindow};

pub const ENV_HORIZON_DAYS: &str = "VENUECAL_HORIZON_DAYS";
pub const ENV_MIN_DATE: &str = "VENUECAL_MIN_DATE";
pub const ENV_MAX_DATE: &str = "VENUECAL_MAX_DATE";
pub const ENV_START_DATE: &str = "VENUECAL_START_DATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Days of slots materialized per venue at creation.
    pub horizon_days: u32,
    /// Outer bound of every availability query.
    pub query_window: DateWindow,
    /// Pin the first horizon day instead of using today's date.
    pub start_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            query_window: DateWindow::new(DateKey(MIN_DATE), DateKey(MAX_DATE)),
            start_date: None,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment; missing or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let horizon_days: u32 = lookup(ENV_HORIZON_DAYS)
            .and_then(|s| s.parse().ok())
            .filter(|d| (1..=MAX_HORIZON_DAYS).contains(d))
            .unwrap_or(defaults.horizon_days);
        let min = lookup(ENV_MIN_DATE)
            .and_then(|s| s.parse().ok())
            .map(DateKey)
            .filter(DateKey::is_valid)
            .unwrap_or(defaults.query_window.min);
        let max = lookup(ENV_MAX_DATE)
            .and_then(|s| s.parse().ok())
            .map(DateKey)
            .filter(DateKey::is_valid)
            .unwrap_or(defaults.query_window.max);
        let query_window = if min <= max {
            DateWindow::new(min, max)
        } else {
            defaults.query_window
        };
        let start_date = lookup(ENV_START_DATE)
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
            .filter(|d| DateKey::checked_from_date(*d).is_some());

        Self {
            horizon_days,
            query_window,
            start_date,
        }
    }

    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days.clamp(1, MAX_HORIZON_DAYS);
        self
    }

    /// Ignored for dates outside 2000–2099.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        if DateKey::checked_from_date(date).is_some() {
            self.start_date = Some(date);
        }
        self
    }

    /// Ignored unless both bounds are valid keys and `min <= max`.
    pub fn with_query_window(mut self, window: DateWindow) -> Self {
        if window.min.is_valid() && window.max.is_valid() && window.min <= window.max {
            self.query_window = window;
        }
        self
    }
}
