//! Text shown next to readings and charts.

use crate::models::{Location, parse_naive_timestamp};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime};

pub const ALL_TIME: &str = "All Time";

/// `dd/MM`, as used on chart axes.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// `18th August 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix} {}", date.format("%B %Y"))
}

/// Time of day from an ISO timestamp, e.g. `5:06pm`.
pub fn format_time(iso: &str) -> Option<String> {
    let time = parse_time(iso.trim())?;
    Some(time.format("%-I:%M%P").to_string())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local().time());
    }
    parse_naive_timestamp(raw).map(|parsed| parsed.time())
}

pub fn filter_description(timeframe: &str, location: Option<Location>) -> String {
    if timeframe == ALL_TIME {
        return location
            .map(|location| location.as_str().to_string())
            .unwrap_or_else(|| ALL_TIME.to_string());
    }
    match location {
        Some(location) => format!("{timeframe} {}", location_phrase(location)),
        None => timeframe.to_string(),
    }
}

fn location_phrase(location: Location) -> &'static str {
    match location {
        Location::Home => "at Home",
        Location::Work => "at Work",
        Location::School => "at School",
        Location::Gym => "at the Gym",
        Location::Restaurant => "in Restaurants",
        Location::Outdoors => "When Outdoors",
        Location::Commute => "When Commuting",
        Location::Vacation => "on Vacation",
        Location::Shopping => "When Shopping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_date_ordinals() {
        let date = |d| NaiveDate::from_ymd_opt(2024, 8, d).unwrap();
        assert_eq!(format_long_date(date(18)), "18th August 2024");
        assert_eq!(format_long_date(date(1)), "1st August 2024");
        assert_eq!(format_long_date(date(22)), "22nd August 2024");
        assert_eq!(format_long_date(date(23)), "23rd August 2024");
        assert_eq!(format_long_date(date(11)), "11th August 2024");
        assert_eq!(format_long_date(date(13)), "13th August 2024");
    }

    #[test]
    fn time_is_twelve_hour_lowercase() {
        assert_eq!(format_time("2024-08-18T17:06").as_deref(), Some("5:06pm"));
        assert_eq!(format_time("2024-08-18T17:06:00").as_deref(), Some("5:06pm"));
        assert_eq!(format_time("2024-08-18T09:30:00.5").as_deref(), Some("9:30am"));
        assert_eq!(format_time("2024-08-18T00:15:00+02:00").as_deref(), Some("12:15am"));
        assert_eq!(format_time("not a time"), None);
    }

    #[test]
    fn short_date_is_day_then_month() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(format_short_date(date), "02/01");
    }

    #[test]
    fn descriptions() {
        assert_eq!(filter_description("Last 7 Days", None), "Last 7 Days");
        assert_eq!(
            filter_description("Last 7 Days", Some(Location::Gym)),
            "Last 7 Days at the Gym"
        );
        assert_eq!(filter_description(ALL_TIME, None), "All Time");
        assert_eq!(filter_description(ALL_TIME, Some(Location::Work)), "Work");
    }
}
