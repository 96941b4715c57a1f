//! Diagnostic endpoint payloads.

use serde::{Deserialize, Serialize};

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status, e.g. `healthy`.
    pub status: String,
    /// Free-form message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the recognition model is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
    /// Model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Decision threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// `GET /model-info` response. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Model family description.
    #[serde(default)]
    pub model_type: Option<String>,
    /// Decision threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Everything else the backend reported.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /verify/config` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSettings {
    /// Decision threshold used by the backend.
    pub threshold: f64,
    /// Accepted file extensions.
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size accepted by the backend, in MB.
    pub max_file_size_mb: f64,
}
