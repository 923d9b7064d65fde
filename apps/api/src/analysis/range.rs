use chrono::{Duration, NaiveDate};

/// Closed range enum for document summaries. Anything unrecognized is
/// treated as the 30-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisRange {
    ThirtyDays,
    YearDays,
}

impl AnalysisRange {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("365d") => AnalysisRange::YearDays,
            _ => AnalysisRange::ThirtyDays,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisRange::ThirtyDays => "最近一个月",
            AnalysisRange::YearDays => "最近一年",
        }
    }

    /// Inclusive `(start, end)` date keys. End is always "today" (UTC);
    /// start subtracts 29 or 364 days so the window spans exactly 30 or
    /// 365 calendar days.
    pub fn window(self, today: NaiveDate) -> (String, String) {
        let days_back = match self {
            AnalysisRange::ThirtyDays => 29,
            AnalysisRange::YearDays => 364,
        };
        let start = today - Duration::days(days_back);
        (
            start.format("%Y-%m-%d").to_string(),
            today.format("%Y-%m-%d").to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_known_ranges() {
        assert_eq!(AnalysisRange::parse(Some("30d")), AnalysisRange::ThirtyDays);
        assert_eq!(AnalysisRange::parse(Some("365d")), AnalysisRange::YearDays);
    }

    #[test]
    fn test_parse_defaults_to_thirty_days() {
        assert_eq!(AnalysisRange::parse(None), AnalysisRange::ThirtyDays);
        assert_eq!(AnalysisRange::parse(Some("7d")), AnalysisRange::ThirtyDays);
        assert_eq!(AnalysisRange::parse(Some("")), AnalysisRange::ThirtyDays);
    }

    #[test]
    fn test_thirty_day_window_spans_thirty_days() {
        let (start, end) = AnalysisRange::ThirtyDays.window(day("2024-03-15"));
        assert_eq!(start, "2024-02-15");
        assert_eq!(end, "2024-03-15");
    }

    #[test]
    fn test_year_window_spans_365_days() {
        let (start, end) = AnalysisRange::YearDays.window(day("2024-03-15"));
        assert_eq!(start, "2023-03-17"); // 2024 is a leap year
        assert_eq!(end, "2024-03-15");
    }
}
