/// LLM-backed line classification:
/// 1. Build a prompt naming the closed category set and embedding the line
/// 2. Send one chat request to the resolved model
/// 3. Normalize the reply and map it onto a category (exact token, then keyword ladder)
///
/// Failures at any step fall back to `Category::DEFAULT`.
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::category::Category;
use crate::readiness::ResolvedModel;
use crate::traits::{Classifier, InferenceBackend};

pub struct LineClassifier {
    backend: Arc<dyn InferenceBackend>,
    model: ResolvedModel,
    name: String,
}

impl LineClassifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, model: ResolvedModel) -> Self {
        let name = format!("ollama/{}", model);
        Self {
            backend,
            model,
            name,
        }
    }

    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    pub fn build_prompt(line: &str) -> String {
        let categories = Category::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Classify the following log line into exactly one of these categories: {categories}.\n\
             Respond with only the category name, nothing else.\n\
             Log line: {line}"
        )
    }

    /// Trim and lowercase a raw reply
    pub fn normalize(reply: &str) -> String {
        reply.trim().to_lowercase()
    }

    /// Map raw reply text onto a category, defaulting when nothing matches
    pub fn resolve_reply(reply: &str) -> Category {
        let normalized = Self::normalize(reply);
        match Category::match_reply(&normalized) {
            Some(category) => category,
            None => {
                warn!(
                    "Received unknown category '{}' from model, using '{}'",
                    normalized,
                    Category::DEFAULT
                );
                Category::DEFAULT
            }
        }
    }
}

#[async_trait]
impl Classifier for LineClassifier {
    async fn classify(&self, line: &str) -> Category {
        let prompt = Self::build_prompt(line);

        match self.backend.chat(self.model.as_str(), &prompt).await {
            Ok(reply) => {
                let category = Self::resolve_reply(&reply.text);
                debug!("{} <- {}", category, line);
                category
            }
            Err(e) => {
                warn!("Error classifying line '{}': {:#}", line, e);
                Category::DEFAULT
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
