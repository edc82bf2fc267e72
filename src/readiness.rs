/// Blocking gates that hold the run until the inference service is usable:
/// 1. `ServiceReadinessGate` waits for the server to answer health probes
/// 2. `ModelAvailabilityGate` waits for a model with the wanted name prefix
///    and resolves its exact identifier
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClassifierError;
use crate::retry::retry_until;
use crate::traits::InferenceBackend;

/// Exact model identifier every classification in a run is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel(String);

impl ResolvedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First name in service order that starts with `prefix`
pub fn first_matching<'a>(names: &'a [String], prefix: &str) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| name.starts_with(prefix))
}

pub struct ServiceReadinessGate {
    interval: Duration,
    timeout: Duration,
}

impl ServiceReadinessGate {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ready_interval, config.ready_timeout)
    }

    pub async fn await_ready(&self, backend: &dyn InferenceBackend) -> Result<(), ClassifierError> {
        let ready = retry_until(
            |attempt| async move {
                match backend.probe_health().await {
                    Ok(()) => {
                        info!("✅ Ollama server is up at {}", backend.endpoint());
                        Some(())
                    }
                    Err(e) => {
                        info!("⏳ Waiting for Ollama server (attempt {}): {}", attempt, e);
                        None
                    }
                }
            },
            self.interval,
            self.timeout,
        )
        .await;

        ready.ok_or_else(|| ClassifierError::ServiceTimeout {
            endpoint: backend.endpoint().to_string(),
            waited: self.timeout,
        })
    }
}

pub struct ModelAvailabilityGate {
    name_prefix: String,
    interval: Duration,
    timeout: Duration,
    pull_missing: bool,
}

impl ModelAvailabilityGate {
    pub fn new(name_prefix: &str, timeout: Duration, interval: Duration) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
            interval,
            timeout,
            pull_missing: false,
        }
    }

    /// Request a pull of `name_prefix` before polling if no match is registered yet
    pub fn with_pull_missing(mut self, pull_missing: bool) -> Self {
        self.pull_missing = pull_missing;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.model_prefix, config.model_timeout, config.model_interval)
            .with_pull_missing(config.pull_missing_model)
    }

    pub async fn await_model(
        &self,
        backend: &dyn InferenceBackend,
    ) -> Result<ResolvedModel, ClassifierError> {
        let started = Instant::now();
        if self.pull_missing
            && tokio::time::timeout(self.timeout, self.pull_if_missing(backend))
                .await
                .is_err()
        {
            warn!(
                "Pull of '{}' did not finish within {:?}",
                self.name_prefix, self.timeout
            );
        }
        // The pull counts against the same deadline as the polling
        let remaining = self.timeout.saturating_sub(started.elapsed());

        let prefix = self.name_prefix.as_str();
        let resolved = retry_until(
            |_| async move {
                match backend.list_models().await {
                    Ok(names) => {
                        info!("📦 Available models: {:?}", names);
                        if let Some(name) = first_matching(&names, prefix) {
                            info!("✅ Model '{}' is ready", name);
                            return Some(ResolvedModel::new(name));
                        }
                    }
                    Err(e) => warn!("Error checking models: {:#}", e),
                }
                info!("⏳ Waiting for model '{}'...", prefix);
                None
            },
            self.interval,
            remaining,
        )
        .await;

        resolved.ok_or_else(|| ClassifierError::ModelTimeout {
            prefix: self.name_prefix.clone(),
            endpoint: backend.endpoint().to_string(),
            waited: self.timeout,
        })
    }

    async fn pull_if_missing(&self, backend: &dyn InferenceBackend) {
        match backend.list_models().await {
            Ok(names) if first_matching(&names, &self.name_prefix).is_some() => {
                info!("Model '{}' already available", self.name_prefix);
            }
            Ok(_) => {
                info!("Pulling model '{}' ...", self.name_prefix);
                match backend.pull_model(&self.name_prefix).await {
                    Ok(()) => info!("Model '{}' pulled successfully", self.name_prefix),
                    Err(e) => warn!("Pull of '{}' failed: {:#}", self.name_prefix, e),
                }
            }
            Err(e) => warn!("Could not list models before pull: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_matching_keeps_service_order() {
        let listed = names(&["mistral:7b", "llama2:13b", "llama2:latest"]);
        assert_eq!(first_matching(&listed, "llama2"), Some("llama2:13b"));
    }

    #[test]
    fn test_first_matching_is_prefix_only() {
        let listed = names(&["codellama2:7b", "my-llama2"]);
        assert_eq!(first_matching(&listed, "llama2"), None);
    }

    #[test]
    fn test_first_matching_empty_listing() {
        assert_eq!(first_matching(&[], "llama2"), None);
    }
}
