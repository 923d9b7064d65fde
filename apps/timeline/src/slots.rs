//! The fixed 30-minute slot grid and its date/time helpers. Pure functions
//! of their inputs; the grid itself depends on nothing.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Slots per day at 30-minute granularity.
pub const SLOTS_PER_DAY: usize = 48;

/// One fixed half-hour interval. The final slot of the day ends at "24:00"
/// rather than wrapping to "00:00".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTime {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Recorded,
    Current,
    Future,
}

/// All 48 half-hour slots of a day, 00:00 through 23:30, in order. Stable
/// and idempotent: the same grid every call.
pub fn day_slots() -> Vec<SlotTime> {
    let mut slots = Vec::with_capacity(SLOTS_PER_DAY);
    for hour in 0..24u32 {
        for minute in [0u32, 30] {
            let (end_hour, end_minute) = if minute == 30 {
                (hour + 1, 0)
            } else {
                (hour, 30)
            };
            slots.push(SlotTime {
                start_time: format!("{hour:02}:{minute:02}"),
                end_time: format!("{end_hour:02}:{end_minute:02}"),
            });
        }
    }
    slots
}

/// Formats a date as the `YYYY-MM-DD` key used throughout the API.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// The start time of the slot containing `time`: floor to the 30-minute
/// grid.
pub fn current_slot_start(time: NaiveTime) -> String {
    let minute = if time.minute() < 30 { 0 } else { 30 };
    format!("{:02}:{minute:02}", time.hour())
}
