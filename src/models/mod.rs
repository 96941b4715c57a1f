//! Data models for the face verification client.
//!
//! Wire types deserialize what the backend returns; domain types are what the
//! rest of the crate hands to callers. Verification results are the exception:
//! they are never deserialized directly, only produced by
//! [`ResultInterpreter`].

mod diagnostics;
mod history;
mod image;
mod outcome;
mod user;

pub use diagnostics::{HealthStatus, ModelInfo, VerificationSettings};
pub use history::{HistoryListing, HistoryRecord, HistorySummary, MatchResult};
pub use image::ImageFile;
pub use outcome::{
    ConfidenceSource, DIFFERENT_PEOPLE_MESSAGE, DataQuality, RawMetrics, ResponseShape,
    ResultInterpreter, SAME_PERSON_MESSAGE, VerificationOutcome,
};
pub use user::{Session, UserRecord};

/// Lenient timestamp parsing for backend records.
///
/// The backend emits naive UTC timestamps (`2024-05-01T10:20:30.123456`)
/// as well as RFC 3339 ones; both are accepted.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parses a backend timestamp; naive values are taken as UTC.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map_or(Ok(None), |raw| {
            parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
        })
    }

}
