//! Email classification pipeline.
//!
//! Every email flows through:
//! 1. `normalize()`: header/signature/whitespace cleanup (no LLM)
//! 2. `RemoteClassifier::classify()`: remote label, `FallbackClassifier` on failure
//! 3. `ResponseGenerator::generate()`: remote reply, fixed template on failure
//!
//! `ClassificationPipeline` runs the three in order and assembles the result.
//! Remote failures are absorbed at each step and never reach the caller.

pub mod classifier;
pub mod normalize;
pub mod processor;
pub mod responder;
pub mod rules;
pub mod types;

pub use classifier::{ClassifierConfig, RemoteClassifier, RemoteVerdict, parse_label};
pub use normalize::normalize;
pub use processor::ClassificationPipeline;
pub use responder::{GeneratorConfig, ResponseGenerator, template_reply};
pub use rules::{FallbackClassifier, KeywordSide, ScoreTally, classify_fallback};
pub use types::{ClassificationLabel, ClassificationResult, Engine, ServiceStatus};
