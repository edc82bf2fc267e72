use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL_PREFIX: &str = "llama2";

#[derive(Debug, Clone)]
pub struct Config {
    // Inference endpoint
    pub ollama_host: String,
    pub request_timeout: Duration,

    // Service readiness gate
    pub ready_timeout: Duration,
    pub ready_interval: Duration,

    // Model availability gate
    pub model_prefix: String,
    pub model_timeout: Duration,
    pub model_interval: Duration,
    pub pull_missing_model: bool,

    // Output
    pub output_dir: PathBuf,
    pub file_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            request_timeout: Duration::from_secs(60),
            ready_timeout: Duration::from_secs(30),
            ready_interval: Duration::from_secs(2),
            model_prefix: DEFAULT_MODEL_PREFIX.to_string(),
            model_timeout: Duration::from_secs(900),
            model_interval: Duration::from_secs(10),
            pull_missing_model: false,
            output_dir: PathBuf::from("."),
            file_concurrency: 1,
        }
    }
}

impl Config {
    /// Load from process environment (and a `.env` file if one is present)
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            ollama_host: lookup("OLLAMA_HOST")
                .map(|host| host.trim_end_matches('/').to_string())
                .unwrap_or(defaults.ollama_host),

            request_timeout: secs_or(&lookup, "OLLAMA_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,

            ready_timeout: secs_or(&lookup, "OLLAMA_READY_TIMEOUT_SECS", defaults.ready_timeout)?,
            ready_interval: defaults.ready_interval,

            model_prefix: lookup("CLASSIFIER_MODEL").unwrap_or(defaults.model_prefix),
            model_timeout: secs_or(&lookup, "OLLAMA_MODEL_TIMEOUT_SECS", defaults.model_timeout)?,
            model_interval: secs_or(&lookup, "OLLAMA_MODEL_INTERVAL_SECS", defaults.model_interval)?,
            pull_missing_model: match lookup("OLLAMA_PULL_MISSING") {
                Some(raw) => parse_flag(&raw)
                    .with_context(|| format!("Invalid OLLAMA_PULL_MISSING value '{}'", raw))?,
                None => defaults.pull_missing_model,
            },

            output_dir: lookup("CLASSIFIER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            file_concurrency: parse_or(&lookup, "CLASSIFIER_FILE_CONCURRENCY", defaults.file_concurrency)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ollama_host.is_empty() {
            anyhow::bail!("OLLAMA_HOST must not be empty");
        }
        if self.model_prefix.is_empty() {
            anyhow::bail!("CLASSIFIER_MODEL must not be empty");
        }
        if self.ready_interval.is_zero() || self.model_interval.is_zero() {
            anyhow::bail!("Polling intervals must be greater than zero");
        }
        if self.file_concurrency == 0 {
            anyhow::bail!("CLASSIFIER_FILE_CONCURRENCY must be at least 1");
        }
        Ok(())
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Ollama Host: {}", self.ollama_host);
        tracing::info!("   Request Timeout: {:?}", self.request_timeout);
        tracing::info!(
            "   Readiness: timeout {:?}, interval {:?}",
            self.ready_timeout,
            self.ready_interval
        );
        tracing::info!("   Model Prefix: {}", self.model_prefix);
        tracing::info!(
            "   Model Wait: timeout {:?}, interval {:?}",
            self.model_timeout,
            self.model_interval
        );
        tracing::info!("   Pull Missing Model: {}", self.pull_missing_model);
        tracing::info!("   Output Directory: {}", self.output_dir.display());
        tracing::info!("   File Concurrency: {}", self.file_concurrency);
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value '{}'", key, raw)),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.model_prefix, "llama2");
        assert_eq!(config.ready_interval, Duration::from_secs(2));
        assert_eq!(config.ready_timeout, Duration::from_secs(30));
        assert_eq!(config.model_timeout, Duration::from_secs(900));
        assert_eq!(config.model_interval, Duration::from_secs(10));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.file_concurrency, 1);
        assert!(!config.pull_missing_model);
    }

    #[test]
    fn test_host_override_trims_trailing_slash() {
        let config =
            Config::from_lookup(lookup_from(&[("OLLAMA_HOST", "http://ollama:11434/")])).unwrap();
        assert_eq!(config.ollama_host, "http://ollama:11434");
    }

    #[test]
    fn test_numeric_and_flag_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OLLAMA_MODEL_TIMEOUT_SECS", "120"),
            ("OLLAMA_MODEL_INTERVAL_SECS", " 5 "),
            ("OLLAMA_PULL_MISSING", "yes"),
            ("CLASSIFIER_FILE_CONCURRENCY", "4"),
        ]))
        .unwrap();
        assert_eq!(config.model_timeout, Duration::from_secs(120));
        assert_eq!(config.model_interval, Duration::from_secs(5));
        assert!(config.pull_missing_model);
        assert_eq!(config.file_concurrency, 4);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("OLLAMA_READY_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("OLLAMA_READY_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(
            Config::from_lookup(lookup_from(&[("OLLAMA_MODEL_INTERVAL_SECS", "0")])).is_err()
        );
        assert!(
            Config::from_lookup(lookup_from(&[("CLASSIFIER_FILE_CONCURRENCY", "0")])).is_err()
        );
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("OLLAMA_PULL_MISSING", "maybe")])).is_err());
    }
}
