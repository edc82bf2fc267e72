/// Dependency injection traits for the classification pipeline
///
/// This module provides trait-based abstractions for:
/// - The inference service (health, model registry, chat)
/// - Line classification
///
/// This allows the gates and the partitioner to run against a live Ollama
/// server, a scripted backend in tests, or a stub classifier.
use crate::category::Category;
use crate::llm_service::InferenceReply;
use anyhow::Result;
use async_trait::async_trait;

// ============================================================================
// Inference Backend Trait
// ============================================================================

/// Trait for the remote inference service
///
/// Every method is a single blocking round-trip; callers decide whether a
/// failure is transient (gates) or degrades to a default (classifier).
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Lightweight health probe; `Ok` once the service accepts requests
    async fn probe_health(&self) -> Result<()>;

    /// Names of the registered models, in the order the service lists them
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Send one user message to `model` and return the extracted reply text
    async fn chat(&self, model: &str, prompt: &str) -> Result<InferenceReply>;

    /// Ask the service to download a model
    async fn pull_model(&self, name: &str) -> Result<()>;

    /// Get the endpoint/identifier of this backend (for reporting)
    fn endpoint(&self) -> &str;
}

// ============================================================================
// Classifier Trait
// ============================================================================

/// Trait for assigning a category to one log line
///
/// Implementations never fail: anything that goes wrong maps to
/// `Category::DEFAULT`.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a trimmed, non-empty log line
    async fn classify(&self, line: &str) -> Category;

    /// Get the name/identifier of this classifier (for reporting)
    fn name(&self) -> &str;
}
