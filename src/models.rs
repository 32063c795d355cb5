use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Id reserved for readings that exist only on the client.
pub const PLACEHOLDER_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Angry,
    Disgusted,
    Scared,
    Happy,
    Neutral,
    Sad,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgusted,
        Emotion::Scared,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprised,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgusted => "Disgusted",
            Emotion::Scared => "Scared",
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Surprised => "Surprised",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Home,
    Work,
    School,
    Gym,
    Restaurant,
    Outdoors,
    Commute,
    Vacation,
    Shopping,
}

impl Location {
    pub const ALL: [Location; 9] = [
        Location::Home,
        Location::Work,
        Location::School,
        Location::Gym,
        Location::Restaurant,
        Location::Outdoors,
        Location::Commute,
        Location::Vacation,
        Location::Shopping,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Home => "Home",
            Location::Work => "Work",
            Location::School => "School",
            Location::Gym => "Gym",
            Location::Restaurant => "Restaurant",
            Location::Outdoors => "Outdoors",
            Location::Commute => "Commute",
            Location::Vacation => "Vacation",
            Location::Shopping => "Shopping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// Both enums travel as case-insensitive names on the wire.
macro_rules! named_enum_serde {
    ($ty:ident, $kind:literal) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                $ty::ALL
                    .into_iter()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

named_enum_serde!(Emotion, "emotion");
named_enum_serde!(Location, "location");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub emotion: Emotion,
    #[serde(default)]
    pub location: Option<Location>,
    pub datetime: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl Reading {
    /// Calendar date of the reading as written by the server.
    pub fn local_date(&self) -> Option<NaiveDate> {
        let raw = self.datetime.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.naive_local().date());
        }
        if let Some(parsed) = parse_naive_timestamp(raw) {
            return Some(parsed.date());
        }
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }
}

/// Naive ISO timestamps, with or without seconds. The readings endpoint
/// sends minute precision (`2024-08-18T17:06`).
pub(crate) fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

pub type EmotionCounts = IndexMap<Emotion, u32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSet {
    #[serde(default)]
    pub readings: Vec<Reading>,
    #[serde(default)]
    pub counts: EmotionCounts,
}

impl ReadingSet {
    /// Prepends `reading` and bumps its emotion tally.
    ///
    /// Returns `false` when a reading with the same server id is already
    /// present; the set is left untouched in that case.
    pub fn insert_newest(&mut self, reading: Reading) -> bool {
        if reading.id != PLACEHOLDER_ID && self.readings.iter().any(|r| r.id == reading.id) {
            return false;
        }
        let entry = self.counts.entry(reading.emotion).or_insert(0);
        *entry = entry.saturating_add(1);
        self.readings.insert(0, reading);
        true
    }

    /// Readings dated `date`, newest first.
    pub fn readings_on(&self, date: NaiveDate) -> Vec<Reading> {
        self.readings
            .iter()
            .filter(|reading| reading.local_date() == Some(date))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: u32,
}

pub type EmotionCountsOverTime = IndexMap<Emotion, Vec<DateCount>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    SevenDays,
    ThirtyDays,
    OneYear,
}

impl Timeframe {
    pub fn as_query(self) -> &'static str {
        match self {
            Timeframe::SevenDays => "7d",
            Timeframe::ThirtyDays => "30d",
            Timeframe::OneYear => "1yr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::SevenDays => "Last 7 Days",
            Timeframe::ThirtyDays => "Last 30 Days",
            Timeframe::OneYear => "Last Year",
        }
    }
}

impl FromStr for Timeframe {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "7d" => Ok(Timeframe::SevenDays),
            "30d" => Ok(Timeframe::ThirtyDays),
            "1yr" => Ok(Timeframe::OneYear),
            other => Err(UnknownVariant {
                kind: "timeframe",
                value: other.to_string(),
            }),
        }
    }
}

/// Body of a create-reading request.
#[derive(Debug, Clone, Serialize)]
pub struct NewReading {
    pub emotion: Emotion,
    pub is_accurate: bool,
    pub timestamp: String,
    pub clerk_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub reading_set: ReadingSet,
    pub last_fetched_at: NaiveDateTime,
}
