pub mod cli;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod quiz;
pub mod services;
pub mod utils;

use crate::database::KeyValueStore;
use crate::error::{Error, Result};
use crate::quiz::{Clock, SystemClock};
use crate::services::{
    generation_service::{GenerationService, QuestionSource},
    history_service::HistoryService,
    preferences_service::PreferencesService,
    quiz_service::QuizService,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: QuizService,
    pub history_service: HistoryService,
    pub preferences_service: PreferencesService,
    pub default_api_key: Option<String>,
}

impl AppState {
    /// Wires the services from the loaded configuration.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        let generation_service =
            GenerationService::new(config.gemini_endpoint.clone(), http_client);

        Ok(Self::with_source(
            store,
            Arc::new(generation_service),
            Arc::new(SystemClock),
            Duration::from_millis(config.timer_tick_ms),
            config.gemini_api_key.clone(),
        ))
    }

    pub fn with_source(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn QuestionSource>,
        clock: Arc<dyn Clock>,
        tick: Duration,
        default_api_key: Option<String>,
    ) -> Self {
        let history_service = HistoryService::new(store.clone());
        let preferences_service = PreferencesService::new(store);
        let quiz_service = QuizService::new(
            source,
            history_service.clone(),
            preferences_service.clone(),
            clock,
            tick,
        );

        Self {
            quiz_service,
            history_service,
            preferences_service,
            default_api_key,
        }
    }
}
