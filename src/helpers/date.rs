//! Date helper functions

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to millisecond precision, which is what the
/// persisted ISO-8601 form can represent.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a date in ISO 8601 form with milliseconds and a `Z` suffix
///
/// # Examples
/// ```ignore
/// date_iso(&date) // -> "2024-01-15T10:30:00.000Z"
/// ```
pub fn date_iso(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse any RFC 3339 timestamp into UTC, truncated to milliseconds like
/// every stored date
pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc).trunc_subsecs(3))
}

/// Format just the day portion (like "2024-01-15")
pub fn short_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Age of a comment for the CLI listing; older than a week prints the day
pub fn relative_date(date: &DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(*date);
    match age.num_minutes() {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{}m ago", m),
        _ if age.num_hours() < 24 => format!("{}h ago", age.num_hours()),
        _ if age.num_days() < 7 => format!("{}d ago", age.num_days()),
        _ => short_date(date),
    }
}

/// Serde adapter keeping record dates in the `2024-01-15T10:30:00.000Z` form
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::date_iso(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date: {}", raw)))
    }

    /// Same as the parent module for `Option<DateTime<Utc>>` fields
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&super::super::date_iso(date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::super::parse_iso(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date: {}", raw))),
                None => Ok(None),
            }
        }
    }
}
