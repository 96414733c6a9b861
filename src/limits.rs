/// Days of slots materialized when a venue is created.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Morning, afternoon, evening.
pub const PERIODS_PER_DAY: u32 = 3;

/// Widest window a `YYMMDD` key can express.
pub const MIN_DATE: u32 = 101;
pub const MAX_DATE: u32 = 991_231;

pub const MAX_VENUES: usize = 10_000;
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_CATEGORY_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 4_096;
pub const MAX_USER_LEN: usize = 256;

/// Priority every entry of the booking report is queued with.
pub const REPORT_PRIORITY: u8 = 3;

/// Boundary sentinel meaning "do not filter on this category".
pub const MATCH_ALL: &str = "All";
