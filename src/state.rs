// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::azure_openai::ChatCompletions;

pub type SharedState = Arc<AppState>;

/// Read-only per-process state handed to every request.
pub struct AppState {
    pub config: Config,
    pub completions: Arc<dyn ChatCompletions>,
}

impl AppState {
    pub fn new(config: Config, completions: Arc<dyn ChatCompletions>) -> Self {
        Self { config, completions }
    }
}
