//! Shared types for the triage pipeline.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::config::TriageConfig;
use crate::input::SUPPORTED_EXTENSIONS;

// ── Classification label ────────────────────────────────────────────

/// Binary triage decision for an email.
///
/// Serialized with the service's wire names (`PRODUTIVO` / `IMPRODUTIVO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    /// Needs a reply or a task.
    #[serde(rename = "PRODUTIVO")]
    Actionable,
    /// Courtesy or social content, no response needed.
    #[serde(rename = "IMPRODUTIVO")]
    NonActionable,
}

impl ClassificationLabel {
    /// Wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actionable => "PRODUTIVO",
            Self::NonActionable => "IMPRODUTIVO",
        }
    }

    /// Human-readable explanation shown next to the label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Actionable => "Este email contém solicitações ou questões que requerem ação.",
            Self::NonActionable => {
                "Este email contém mensagens sociais ou cortesia sem necessidade de ação imediata."
            }
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Engine ──────────────────────────────────────────────────────────

/// Which path produced a step's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// The hosted completion service answered.
    Remote,
    /// Keyword scorer or canned template.
    Fallback,
}

impl Engine {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// A step's output together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decided<T> {
    pub value: T,
    pub engine: Engine,
}

impl<T> Decided<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            engine: Engine::Remote,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            engine: Engine::Fallback,
        }
    }
}

// ── Result record ───────────────────────────────────────────────────

/// Engine name reported when no remote service is configured.
pub const RULE_BASED_ENGINE: &str = "Rule-based fallback";

/// Longest prefix of the normalized text echoed back in a result.
pub const ANALYZED_PREVIEW_CHARS: usize = 300;

/// Outcome of one pipeline run. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Per-run identifier for log correlation.
    pub id: Uuid,
    #[serde(rename = "classification")]
    pub label: ClassificationLabel,
    #[serde(rename = "classification_reason")]
    pub reason: String,
    #[serde(rename = "suggested_response")]
    pub reply: String,
    /// Normalized text, cut to `ANALYZED_PREVIEW_CHARS` with a `...` suffix.
    pub analyzed_content: String,
    /// Characters in the raw input.
    pub char_count: usize,
    /// Characters in the normalized text.
    pub normalized_char_count: usize,
    #[serde(rename = "classification_time", serialize_with = "serialize_secs")]
    pub classification_latency: Duration,
    #[serde(rename = "generation_time", serialize_with = "serialize_secs")]
    pub generation_latency: Duration,
    /// Configured engine at pipeline construction: the model name, or
    /// `RULE_BASED_ENGINE`. Independent of what a given call did.
    #[serde(rename = "model_used")]
    pub engine_used: String,
    /// Path the classification step actually took.
    pub classification_engine: Engine,
    /// Path the reply step actually took.
    pub generation_engine: Engine,
    pub processed_at: DateTime<Utc>,
}

impl ClassificationResult {
    /// Classification latency in seconds, rounded to two decimals.
    pub fn classification_secs(&self) -> f64 {
        round_secs(self.classification_latency)
    }

    /// Generation latency in seconds, rounded to two decimals.
    pub fn generation_secs(&self) -> f64 {
        round_secs(self.generation_latency)
    }
}

/// Seconds rounded to two decimal places.
pub fn round_secs(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100.0).round() / 100.0
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_secs(*duration))
}

/// Cut `text` to `max_chars` characters, appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

// ── Service status ──────────────────────────────────────────────────

/// Health report for the service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub remote_status: &'static str,
    pub model: String,
    pub supported_formats: Vec<&'static str>,
    pub max_file_size_mb: u64,
    pub max_content_chars: usize,
    pub version: &'static str,
}

impl ServiceStatus {
    /// Build the report from the process configuration.
    pub fn from_config(config: &TriageConfig) -> Self {
        let (remote_status, model) = match &config.remote {
            Some(remote) if config.remote_enabled() => ("Connected", remote.model.clone()),
            _ => ("Not configured", RULE_BASED_ENGINE.to_string()),
        };

        Self {
            status: "OK",
            message: "Email classifier service is running",
            remote_status,
            model,
            supported_formats: SUPPORTED_EXTENSIONS.to_vec(),
            max_file_size_mb: config.max_file_bytes / (1024 * 1024),
            max_content_chars: config.max_content_chars,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
