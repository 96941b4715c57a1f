//! Verification history records and their summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Stored verdict of a past verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum MatchResult {
    /// The images were judged to be the same person.
    Match,
    /// The images were judged to be different people.
    NoMatch,
    /// Any other value the backend stored.
    Unknown,
}

impl MatchResult {
    /// Returns the wire string for this result.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::NoMatch => "no_match",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for MatchResult {
    fn from(value: String) -> Self {
        match value.as_str() {
            "match" => Self::Match,
            "no_match" => Self::NoMatch,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted past verification. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record identifier (`_id` on the wire).
    #[serde(alias = "_id")]
    pub id: String,
    /// Stored verdict.
    pub result: MatchResult,
    /// Confidence in [0, 1].
    pub confidence_score: f64,
    /// When the verification ran.
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Stored name of the first image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image1_filename: Option<String>,
    /// Stored name of the second image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image2_filename: Option<String>,
}

/// Counts derived from a history fetch. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistorySummary {
    /// Number of records.
    pub total: usize,
    /// Records with result `match`.
    pub matches: usize,
    /// Records with result `no_match`.
    pub non_matches: usize,
}

impl HistorySummary {
    /// Computes the summary in a single pass.
    ///
    /// Records with an unrecognized result count toward `total` only.
    #[must_use]
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.total += 1;
            match record.result {
                MatchResult::Match => acc.matches += 1,
                MatchResult::NoMatch => acc.non_matches += 1,
                MatchResult::Unknown => {},
            }
            acc
        })
    }
}

/// Records in backend order together with their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryListing {
    /// Records, in the order the backend returned them.
    pub records: Vec<HistoryRecord>,
    /// Summary of `records`.
    pub summary: HistorySummary,
}

impl HistoryListing {
    /// Builds a listing, computing the summary.
    #[must_use]
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        let summary = HistorySummary::from_records(&records);
        Self { records, summary }
    }

    /// Returns true when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
