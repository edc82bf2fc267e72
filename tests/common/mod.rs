//! Test doubles shared by the integration tests
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use log_classifier::category::Category;
use log_classifier::llm_service::InferenceReply;
use log_classifier::traits::{Classifier, InferenceBackend};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Backend whose answers are queued up front
#[derive(Default)]
pub struct ScriptedBackend {
    /// Health probe succeeds from this attempt on (1-based); `None` never succeeds
    pub healthy_from: Option<usize>,
    /// One entry per `list_models` call; the last entry repeats
    pub listings: Mutex<VecDeque<Result<Vec<String>, String>>>,
    /// One entry per `chat` call
    pub replies: Mutex<VecDeque<Result<String, String>>>,
    pub health_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub pulls: Mutex<Vec<String>>,
    /// How long `pull_model` takes to answer
    pub pull_delay: Duration,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn healthy_from(attempt: usize) -> Self {
        Self {
            healthy_from: Some(attempt),
            ..Default::default()
        }
    }

    pub fn never_healthy() -> Self {
        Self::default()
    }

    pub fn with_listings(self, listings: Vec<Result<Vec<&str>, &str>>) -> Self {
        *self.listings.lock().unwrap() = listings
            .into_iter()
            .map(|l| {
                l.map(|names| names.into_iter().map(String::from).collect::<Vec<_>>())
                    .map_err(String::from)
            })
            .collect();
        self
    }

    pub fn with_replies(self, replies: Vec<Result<&str, &str>>) -> Self {
        *self.replies.lock().unwrap() = replies
            .into_iter()
            .map(|r| r.map(String::from).map_err(String::from))
            .collect();
        self
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn probe_health(&self) -> Result<()> {
        let attempt = self.health_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.healthy_from {
            Some(first) if attempt >= first => Ok(()),
            _ => anyhow::bail!("connection refused"),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut listings = self.listings.lock().unwrap();
        let next = if listings.len() > 1 {
            listings.pop_front()
        } else {
            listings.front().cloned()
        };
        match next {
            Some(Ok(names)) => Ok(names),
            Some(Err(e)) => anyhow::bail!(e),
            None => Ok(Vec::new()),
        }
    }

    async fn chat(&self, model: &str, prompt: &str) -> Result<InferenceReply> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(InferenceReply::new(text)),
            Some(Err(e)) => anyhow::bail!(e),
            None => anyhow::bail!("no scripted reply left"),
        }
    }

    async fn pull_model(&self, name: &str) -> Result<()> {
        self.pulls.lock().unwrap().push(name.to_string());
        tokio::time::sleep(self.pull_delay).await;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "scripted://ollama"
    }
}

/// Classifier that looks lines up in a fixed table
pub struct StubClassifier {
    table: HashMap<String, Category>,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(pairs: &[(&str, Category)]) -> Self {
        Self {
            table: pairs
                .iter()
                .map(|(line, category)| (line.to_string(), *category))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, line: &str) -> Category {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.get(line).copied().unwrap_or(Category::DEFAULT)
    }

    fn name(&self) -> &str {
        "stub"
    }
}
