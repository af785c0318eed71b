use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Interval of the booking completion sweep.
pub const BOOKING_SWEEP_INTERVAL_SECS: u64 = 60 * 60 * 24;
