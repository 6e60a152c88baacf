// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Firestore documents store timestamps as fixed-width RFC3339 strings so
//! that string range filters order the same way as the instants they encode.

use chrono::{DateTime, Datelike, Duration, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse any RFC3339 timestamp into UTC.
pub fn parse_utc_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `now` shifted forward by a whole number of days.
pub fn days_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now + Duration::days(i64::from(days))
}

/// Half-open `[start, end)` bounds of a calendar month in UTC.
///
/// `month` is 1-based. Returns `None` for an invalid month/year pair.
pub fn month_bounds(month: u32, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()?;
    Some((start, end))
}

/// Calendar month (1-12) and year of a timestamp.
pub fn month_and_year(date: DateTime<Utc>) -> (u32, i32) {
    (date.month(), date.year())
}

/// Serde adapter storing `DateTime<Utc>` as [`format_utc_rfc3339`] strings.
pub mod utc_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_utc_rfc3339(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid RFC3339 timestamp: {raw}")))
    }

    /// Same encoding for optional fields.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => s.serialize_some(&super::super::format_utc_rfc3339(*date)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| {
                    super::super::parse_utc_rfc3339(&raw).ok_or_else(|| {
                        de::Error::custom(format!("invalid RFC3339 timestamp: {raw}"))
                    })
                })
                .transpose()
        }
    }
}
