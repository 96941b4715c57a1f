//! Canonical verification outcome and the interpreter that produces it.
//!
//! The backend has answered verification requests in several shapes:
//!
//! | Shape | Verdict field | Confidence field |
//! |-------|---------------|------------------|
//! | prediction service | `is_same_person: bool` | `confidence_percentage` (0-100) |
//! | authenticated API | `result: "match" \| "no_match"` | `confidence_score` (0-1) |
//! | extended metrics | either of the above | plus `verification_score`, `cosine_similarity`, `euclidean_distance` |
//!
//! [`ResultInterpreter`] is the single place where these are reconciled.
//! Nothing else in the crate reads raw verification fields.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Default message when the backend says the faces match.
pub const SAME_PERSON_MESSAGE: &str = "The images appear to be of the same person.";

/// Default message when the backend says the faces differ.
pub const DIFFERENT_PEOPLE_MESSAGE: &str = "The images appear to be of different people.";

/// Normalized result of comparing two face images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    /// Whether the two images show the same person.
    pub is_match: bool,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Message for display.
    pub message: String,
    /// Measurements the backend reported, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_metrics: Option<RawMetrics>,
    /// Identifier of the stored verification record, if the backend kept one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
    /// Which field the confidence came from.
    pub confidence_source: ConfidenceSource,
    /// Gaps found while interpreting the response.
    pub data_quality: DataQuality,
}

/// Optional measurements. Absent values stay absent; they are never zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RawMetrics {
    /// Backend verification score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_score: Option<f64>,
    /// Cosine similarity between embeddings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosine_similarity: Option<f64>,
    /// Euclidean distance between embeddings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub euclidean_distance: Option<f64>,
}

impl RawMetrics {
    /// Returns true when no metric is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.verification_score.is_none()
            && self.cosine_similarity.is_none()
            && self.euclidean_distance.is_none()
    }
}

/// Data-quality flags raised during interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DataQuality {
    /// No verdict field was present; `is_match` defaulted to false.
    pub missing_verdict: bool,
    /// No confidence field was present; `confidence` defaulted to 0.
    pub missing_confidence: bool,
    /// The reported confidence fell outside [0, 1] and was clamped.
    pub confidence_clamped: bool,
}

impl DataQuality {
    /// Returns true when no flag is raised.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !(self.missing_verdict || self.missing_confidence || self.confidence_clamped)
    }
}

/// Response shape, detected in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Prediction-service shape with a boolean verdict.
    SamePerson {
        /// The verdict.
        is_same_person: bool,
    },
    /// API shape with a string verdict in `result`.
    Labelled {
        /// The verdict label.
        result: String,
    },
    /// Prediction-service variant carrying only `status`.
    Status {
        /// The verdict label.
        status: String,
    },
    /// None of the known verdict fields.
    Unrecognized,
}

impl ResponseShape {
    /// Classifies a response body.
    #[must_use]
    pub fn detect(body: &Map<String, Value>) -> Self {
        if let Some(is_same_person) = body.get("is_same_person").and_then(Value::as_bool) {
            return Self::SamePerson { is_same_person };
        }
        if let Some(result) = string_field(body, "result") {
            return Self::Labelled { result };
        }
        if let Some(status) = string_field(body, "status") {
            return Self::Status { status };
        }
        Self::Unrecognized
    }

    /// The verdict implied by this shape.
    #[must_use]
    pub fn is_match(&self) -> bool {
        match self {
            Self::SamePerson { is_same_person } => *is_same_person,
            Self::Labelled { result: label } | Self::Status { status: label } => label == "match",
            Self::Unrecognized => false,
        }
    }
}

/// Field the confidence was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// `confidence_score`, already in [0, 1].
    ConfidenceScore,
    /// `confidence_percentage`, divided by 100.
    ConfidencePercentage,
    /// `verification_score`.
    VerificationScore,
    /// Plain `confidence`, already in [0, 1].
    Confidence,
    /// Nothing usable; defaulted to 0.
    Missing,
}

/// Confidence fields in priority order, with their scale divisor.
const CONFIDENCE_FIELDS: [(&str, f64, ConfidenceSource); 4] = [
    ("confidence_score", 1.0, ConfidenceSource::ConfidenceScore),
    (
        "confidence_percentage",
        100.0,
        ConfidenceSource::ConfidencePercentage,
    ),
    (
        "verification_score",
        1.0,
        ConfidenceSource::VerificationScore,
    ),
    ("confidence", 1.0, ConfidenceSource::Confidence),
];

/// Maps backend verification responses to [`VerificationOutcome`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultInterpreter;

impl ResultInterpreter {
    /// Creates an interpreter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Interprets raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the body is not a JSON object.
    pub fn interpret_bytes(&self, body: &[u8]) -> Result<VerificationOutcome> {
        let value: Value = serde_json::from_slice(body).map_err(|e| Error::Transport {
            operation: "interpret_verification".to_string(),
            cause: format!("malformed response: {e}"),
        })?;
        self.interpret(&value)
    }

    /// Interprets a parsed response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the body is not a JSON object.
    pub fn interpret(&self, body: &Value) -> Result<VerificationOutcome> {
        let Some(body) = body.as_object() else {
            return Err(Error::Transport {
                operation: "interpret_verification".to_string(),
                cause: "malformed response: expected a JSON object".to_string(),
            });
        };

        let shape = ResponseShape::detect(body);
        let mut quality = DataQuality {
            missing_verdict: shape == ResponseShape::Unrecognized,
            ..DataQuality::default()
        };
        let is_match = shape.is_match();

        let (confidence, confidence_source) = CONFIDENCE_FIELDS
            .iter()
            .find_map(|(field, divisor, source)| {
                number_field(body, field).map(|v| (v / divisor, *source))
            })
            .unwrap_or((0.0, ConfidenceSource::Missing));
        quality.missing_confidence = confidence_source == ConfidenceSource::Missing;

        let clamped = confidence.clamp(0.0, 1.0);
        quality.confidence_clamped = !(0.0..=1.0).contains(&confidence);

        let message = string_field(body, "message")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message(is_match).to_string());

        let metrics = RawMetrics {
            verification_score: number_field(body, "verification_score"),
            cosine_similarity: number_field(body, "cosine_similarity"),
            euclidean_distance: number_field(body, "euclidean_distance"),
        };

        if !quality.is_clean() {
            tracing::warn!(
                shape = ?shape,
                missing_verdict = quality.missing_verdict,
                missing_confidence = quality.missing_confidence,
                confidence_clamped = quality.confidence_clamped,
                "Verification response has data-quality gaps"
            );
        }

        Ok(VerificationOutcome {
            is_match,
            confidence: clamped,
            message,
            raw_metrics: (!metrics.is_empty()).then_some(metrics),
            verification_id: string_field(body, "verification_id"),
            confidence_source,
            data_quality: quality,
        })
    }
}

const fn default_message(is_match: bool) -> &'static str {
    if is_match {
        SAME_PERSON_MESSAGE
    } else {
        DIFFERENT_PEOPLE_MESSAGE
    }
}

fn number_field(body: &Map<String, Value>, key: &str) -> Option<f64> {
    body.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn string_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn interpret(body: &Value) -> VerificationOutcome {
        ResultInterpreter::new().interpret(body).unwrap()
    }

    #[test]
    fn test_percentage_shape() {
        let outcome = interpret(&json!({"is_same_person": true, "confidence_percentage": 92.5}));
        assert!(outcome.is_match);
        assert!((outcome.confidence - 0.925).abs() < 1e-9);
        assert_eq!(outcome.confidence_source, ConfidenceSource::ConfidencePercentage);
        assert_eq!(outcome.message, SAME_PERSON_MESSAGE);
        assert!(outcome.data_quality.is_clean());
    }

    #[test]
    fn test_labelled_shape() {
        let outcome = interpret(&json!({"result": "no_match", "confidence_score": 0.31}));
        assert!(!outcome.is_match);
        assert!((outcome.confidence - 0.31).abs() < f64::EPSILON);
        assert_eq!(outcome.message, DIFFERENT_PEOPLE_MESSAGE);
        assert!(outcome.raw_metrics.is_none());
    }

    #[test]
    fn test_is_same_person_wins_over_result() {
        let outcome = interpret(&json!({
            "is_same_person": false,
            "result": "match",
            "confidence_score": 0.9
        }));
        assert!(!outcome.is_match);
    }

    #[test_case(json!({"confidence_score": 0.2, "confidence_percentage": 80.0}), 0.2 ; "score beats percentage")]
    #[test_case(json!({"confidence_percentage": 80.0, "verification_score": 0.1}), 0.8 ; "percentage beats verification score")]
    #[test_case(json!({"verification_score": 0.7, "confidence": 0.1}), 0.7 ; "verification score beats plain confidence")]
    #[test_case(json!({"confidence": 0.45}), 0.45 ; "plain confidence last")]
    fn test_confidence_priority(mut body: Value, expected: f64) {
        body["result"] = json!("match");
        let outcome = interpret(&body);
        assert!((outcome.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_confidence_is_flagged() {
        let outcome = interpret(&json!({"result": "match"}));
        assert!((outcome.confidence - 0.0).abs() < f64::EPSILON);
        assert_eq!(outcome.confidence_source, ConfidenceSource::Missing);
        assert!(outcome.data_quality.missing_confidence);
    }

    #[test]
    fn test_missing_verdict_is_flagged() {
        let outcome = interpret(&json!({"confidence_score": 0.5}));
        assert!(!outcome.is_match);
        assert!(outcome.data_quality.missing_verdict);
    }

    #[test]
    fn test_status_fallback() {
        let outcome = interpret(&json!({"status": "match", "confidence": 0.81}));
        assert!(outcome.is_match);
        assert!(!outcome.data_quality.missing_verdict);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped() {
        let outcome = interpret(&json!({"result": "match", "confidence_percentage": 140.0}));
        assert!((outcome.confidence - 1.0).abs() < f64::EPSILON);
        assert!(outcome.data_quality.confidence_clamped);
    }

    #[test]
    fn test_backend_message_preferred() {
        let outcome = interpret(&json!({
            "result": "match",
            "confidence_score": 0.93,
            "message": "Same person detected! (Confidence: 93.00%)",
            "verification_id": "abc123"
        }));
        assert_eq!(outcome.message, "Same person detected! (Confidence: 93.00%)");
        assert_eq!(outcome.verification_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_partial_metrics_are_not_zeroed() {
        let outcome = interpret(&json!({
            "is_same_person": true,
            "confidence_percentage": 88.0,
            "cosine_similarity": 0.77
        }));
        let metrics = outcome.raw_metrics.unwrap();
        assert_eq!(metrics.cosine_similarity, Some(0.77));
        assert_eq!(metrics.verification_score, None);
        assert_eq!(metrics.euclidean_distance, None);

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["raw_metrics"].get("euclidean_distance").is_none());
    }

    #[test]
    fn test_non_numeric_confidence_is_ignored() {
        let outcome = interpret(&json!({"result": "match", "confidence_score": "high", "confidence_percentage": 60}));
        assert!((outcome.confidence - 0.6).abs() < 1e-9);
    }

    #[test_case(json!([1, 2]) ; "array")]
    #[test_case(json!("match") ; "string")]
    #[test_case(Value::Null ; "null")]
    fn test_non_object_is_transport_error(body: Value) {
        let result = ResultInterpreter::new().interpret(&body);
        assert!(matches!(result, Err(Error::Transport { .. })));
    }

    #[test]
    fn test_interpret_bytes_malformed() {
        let result = ResultInterpreter::new().interpret_bytes(b"<html>502</html>");
        assert!(matches!(result, Err(Error::Transport { .. })));
    }
}
