use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Shape check equivalent to `^\d{4}-\d{2}-\d{2}$`. Digit shape only, no
/// calendar validity: "2024-13-40" passes. Known looseness, kept on purpose.
pub fn is_valid_date_key(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0usize, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| b[i].is_ascii_digit())
}

/// Shape check equivalent to `^\d{2}:\d{2}$`.
pub fn is_valid_clock(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5 && b[2] == b':' && [0usize, 1, 3, 4].iter().all(|&i| b[i].is_ascii_digit())
}

/// The slot exactly 30 minutes before `(date, start_time)`, crossing
/// midnight into the previous date for 00:00. Plain datetime arithmetic,
/// no "nearest non-empty" search (that lives client-side).
pub fn previous_slot(date: &str, start_time: &str) -> Option<(String, String)> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let t = NaiveTime::parse_from_str(start_time, "%H:%M").ok()?;
    let prev = NaiveDateTime::new(d, t) - Duration::minutes(30);
    Some((
        prev.date().format("%Y-%m-%d").to_string(),
        prev.time().format("%H:%M").to_string(),
    ))
}
