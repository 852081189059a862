//! Classification pipeline: normalize, classify, reply.
//!
//! Flow:
//! 1. Normalization (pure, no LLM)
//! 2. Classification → remote first, rules on failure (timed)
//! 3. Reason text from the label
//! 4. Reply generation → remote first, template on failure (timed)
//!
//! Steps run strictly in order since the reply depends on the label. The
//! pipeline holds no per-request state and can serve concurrent calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm::provider::LlmProvider;
use crate::pipeline::classifier::{ClassifierConfig, RemoteClassifier};
use crate::pipeline::normalize::normalize;
use crate::pipeline::responder::{GeneratorConfig, ResponseGenerator};
use crate::pipeline::rules::FallbackClassifier;
use crate::pipeline::types::{
    ANALYZED_PREVIEW_CHARS, ClassificationLabel, ClassificationResult, Engine, RULE_BASED_ENGINE,
    preview,
};

/// End-to-end email classification pipeline.
pub struct ClassificationPipeline {
    classifier: RemoteClassifier,
    generator: ResponseGenerator,
    engine_used: String,
}

impl ClassificationPipeline {
    /// Create a pipeline with default rules and sampling settings.
    ///
    /// `llm = None` runs entirely on rules and templates.
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self::with_config(
            llm,
            FallbackClassifier::default_rules(),
            ClassifierConfig::default(),
            GeneratorConfig::default(),
        )
    }

    /// Create a pipeline with explicit components.
    pub fn with_config(
        llm: Option<Arc<dyn LlmProvider>>,
        rules: FallbackClassifier,
        classifier_config: ClassifierConfig,
        generator_config: GeneratorConfig,
    ) -> Self {
        let engine_used = llm
            .as_ref()
            .map(|l| l.model_name().to_string())
            .unwrap_or_else(|| RULE_BASED_ENGINE.to_string());

        Self {
            classifier: RemoteClassifier::new(llm.clone(), rules, classifier_config),
            generator: ResponseGenerator::new(llm, generator_config),
            engine_used,
        }
    }

    /// Engine reported in every result: the configured model, or the
    /// rule-based marker.
    pub fn engine_used(&self) -> &str {
        &self.engine_used
    }

    /// Run one email through the pipeline. Never fails.
    ///
    /// Input that normalizes to nothing is not classified: the result is
    /// NON_ACTIONABLE with an empty reply and zero latencies.
    pub async fn run(&self, raw_text: &str) -> ClassificationResult {
        let id = Uuid::new_v4();
        let char_count = raw_text.chars().count();
        let normalized = normalize(raw_text);

        info!(
            id = %id,
            chars = char_count,
            normalized_chars = normalized.chars().count(),
            "Processing email"
        );

        if normalized.is_empty() {
            debug!(id = %id, "Nothing left after normalization, skipping classification");
            return self.assemble(
                id,
                char_count,
                &normalized,
                Step::skipped(ClassificationLabel::NonActionable),
                Step::skipped(String::new()),
            );
        }

        let started = Instant::now();
        let decided = self.classifier.classify_decided(&normalized).await;
        let classification = Step {
            value: decided.value,
            engine: decided.engine,
            elapsed: started.elapsed(),
        };

        let started = Instant::now();
        let decided = self
            .generator
            .generate_decided(&normalized, classification.value)
            .await;
        let reply = Step {
            value: decided.value,
            engine: decided.engine,
            elapsed: started.elapsed(),
        };

        let result = self.assemble(id, char_count, &normalized, classification, reply);
        info!(
            id = %result.id,
            label = result.label.as_str(),
            classification_engine = result.classification_engine.label(),
            generation_engine = result.generation_engine.label(),
            classification_secs = result.classification_secs(),
            generation_secs = result.generation_secs(),
            "Email classified"
        );
        result
    }

    fn assemble(
        &self,
        id: Uuid,
        char_count: usize,
        normalized: &str,
        classification: Step<ClassificationLabel>,
        reply: Step<String>,
    ) -> ClassificationResult {
        ClassificationResult {
            id,
            label: classification.value,
            reason: classification.value.reason().to_string(),
            reply: reply.value,
            analyzed_content: preview(normalized, ANALYZED_PREVIEW_CHARS),
            char_count,
            normalized_char_count: normalized.chars().count(),
            classification_latency: classification.elapsed,
            generation_latency: reply.elapsed,
            engine_used: self.engine_used.clone(),
            classification_engine: classification.engine,
            generation_engine: reply.engine,
            processed_at: Utc::now(),
        }
    }
}

/// One timed pipeline step.
struct Step<T> {
    value: T,
    engine: Engine,
    elapsed: Duration,
}

impl<T> Step<T> {
    fn skipped(value: T) -> Self {
        Self {
            value,
            engine: Engine::Fallback,
            elapsed: Duration::ZERO,
        }
    }
}
