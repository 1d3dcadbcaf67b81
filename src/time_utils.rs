// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Compact `yymmddHHMMSS` stamp used as local id of synthetic group uids.
pub fn group_stamp(date: DateTime<Utc>) -> i64 {
    let stamp = date.format("%y%m%d%H%M%S").to_string();
    // Twelve ASCII digits always fit into an i64.
    stamp.parse().unwrap_or_default()
}

/// Duration in (fractional) seconds.
pub fn as_seconds(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// Render a duration as `[-]HH:MM:SS`.
pub fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let secs = duration.num_seconds().abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Whole seconds to a duration, failing instead of panicking when out of range.
fn seconds<E: serde::de::Error>(secs: i64) -> Result<TimeDelta, E> {
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| E::custom(format!("duration of {} seconds out of range", secs)))
}

/// Serde adapter storing an optional duration as whole seconds.
pub mod duration_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<TimeDelta>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        Option::<i64>::deserialize(deserializer)?
            .map(|secs| super::seconds::<D::Error>(secs))
            .transpose()
    }
}

/// Serde adapter for a required duration stored as whole seconds.
pub mod gap_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        super::seconds(i64::deserialize(deserializer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_group_stamp() {
        let date = Utc.with_ymd_and_hms(2022, 2, 22, 10, 0, 1).unwrap();
        assert_eq!(group_stamp(date), 220222100001);
    }

    #[test]
    fn test_format_utc_rfc3339() {
        let date = Utc.with_ymd_and_hms(2022, 2, 22, 10, 0, 1).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2022-02-22T10:00:01Z");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(65)), "01:05:00");
        assert_eq!(format_duration(TimeDelta::seconds(-90)), "-00:01:30");
    }
}
