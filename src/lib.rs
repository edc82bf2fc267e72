// Core modules
pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
pub mod llm_service;
pub mod partitioner;
pub mod pipeline;
pub mod readiness;
pub mod retry;
pub mod traits;
pub mod walker;
