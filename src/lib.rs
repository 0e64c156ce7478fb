// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sassy Coach: a daily accountability coach
//!
//! This crate provides the backend API that issues one mission per user per
//! day, tracks completions as a day streak, and bounds rerolls.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use clock::{DayClock, DayWindow};
use config::Config;
use db::Store;
use services::{
    ContentResolver, GenerationError, GenerativeSource, IdentityService, MissionService,
    OpenAiClient,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub identity: IdentityService,
    pub missions: MissionService,
}

impl AppState {
    /// Production wiring: pool, generative provider (if configured), templates.
    pub fn new(config: Config, db: Arc<dyn Store>) -> Result<Self, GenerationError> {
        let generative = match &config.generation {
            Some(generation) => {
                let client = OpenAiClient::new(
                    &generation.base_url,
                    &generation.api_key,
                    &generation.model,
                    config.generation_timeout,
                )?;
                Some(GenerativeSource::new(client, config.generation_timeout))
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set, generative tier disabled");
                None
            }
        };

        let resolver = ContentResolver::standard(db.clone(), generative);
        let clock = DayClock::new(DayWindow::from_minutes(config.day_window_minutes));
        Ok(Self::with_parts(config, db, resolver, clock))
    }

    /// Assemble state from explicit parts (tests swap the resolver and clock).
    pub fn with_parts(
        config: Config,
        db: Arc<dyn Store>,
        resolver: ContentResolver,
        clock: DayClock,
    ) -> Self {
        let identity = IdentityService::new(
            &config.auth_jwt_secret,
            &config.auth_jwt_audience,
            db.clone(),
        );
        let missions = MissionService::new(db.clone(), resolver, clock);

        Self {
            config,
            db,
            identity,
            missions,
        }
    }
}
