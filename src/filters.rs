//! Calendar windows used to scope reading queries.
//!
//! Weeks run Monday through Sunday regardless of locale.

use crate::models::{Emotion, Location};
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Week,
    Month,
    Year,
}

impl TimeWindow {
    pub fn filter(self, today: NaiveDate) -> ReadingFilters {
        match self {
            TimeWindow::Week => week_filter(today),
            TimeWindow::Month => month_filter(today),
            TimeWindow::Year => year_filter(today),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub emotion: Option<Emotion>,
    pub location: Option<Location>,
}

impl ReadingFilters {
    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Query pairs in the order the backend documents them.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("start_date".to_string(), date_key(start)));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date".to_string(), date_key(end)));
        }
        if let Some(emotion) = self.emotion {
            pairs.push(("emotion".to_string(), emotion.as_str().to_lowercase()));
        }
        if let Some(location) = self.location {
            pairs.push(("location".to_string(), location.as_str().to_lowercase()));
        }
        pairs
    }
}

pub fn week_filter(today: NaiveDate) -> ReadingFilters {
    let start = week_start(today);
    window(start, start + Duration::days(6))
}

pub fn month_filter(today: NaiveDate) -> ReadingFilters {
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month
        .and_then(|first| first.pred_opt())
        .unwrap_or(today);
    window(start, end)
}

pub fn year_filter(today: NaiveDate) -> ReadingFilters {
    let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
    window(start, end)
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn window(start: NaiveDate, end: NaiveDate) -> ReadingFilters {
    ReadingFilters {
        start_date: Some(start),
        end_date: Some(end),
        ..ReadingFilters::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bounds(filters: &ReadingFilters) -> (String, String) {
        (
            date_key(filters.start_date.unwrap()),
            date_key(filters.end_date.unwrap()),
        )
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        // 2024-08-18 is a Sunday.
        let (start, end) = bounds(&week_filter(day(2024, 8, 18)));
        assert_eq!(start, "2024-08-12");
        assert_eq!(end, "2024-08-18");

        let (start, end) = bounds(&week_filter(day(2024, 8, 19)));
        assert_eq!(start, "2024-08-19");
        assert_eq!(end, "2024-08-25");
    }

    #[test]
    fn week_spanning_new_year() {
        let (start, end) = bounds(&week_filter(day(2025, 1, 1)));
        assert_eq!(start, "2024-12-30");
        assert_eq!(end, "2025-01-05");
    }

    #[test]
    fn month_handles_leap_february_and_december() {
        let (start, end) = bounds(&month_filter(day(2024, 2, 10)));
        assert_eq!(start, "2024-02-01");
        assert_eq!(end, "2024-02-29");

        let (start, end) = bounds(&month_filter(day(2023, 12, 31)));
        assert_eq!(start, "2023-12-01");
        assert_eq!(end, "2023-12-31");
    }

    #[test]
    fn year_covers_calendar_year() {
        let (start, end) = bounds(&year_filter(day(2024, 6, 15)));
        assert_eq!(start, "2024-01-01");
        assert_eq!(end, "2024-12-31");
    }

    #[test]
    fn same_week_uses_monday_boundary() {
        assert!(same_week(day(2024, 8, 12), day(2024, 8, 18)));
        assert!(!same_week(day(2024, 8, 18), day(2024, 8, 19)));
    }

    #[test]
    fn query_includes_extra_filters() {
        let filters = TimeWindow::Week
            .filter(day(2024, 8, 14))
            .with_emotion(Emotion::Happy)
            .with_location(Location::Gym);
        let query = filters.to_query();
        assert_eq!(
            query,
            vec![
                ("start_date".to_string(), "2024-08-12".to_string()),
                ("end_date".to_string(), "2024-08-18".to_string()),
                ("emotion".to_string(), "happy".to_string()),
                ("location".to_string(), "gym".to_string()),
            ]
        );
    }
}
