// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mission content resolution.
//!
//! Content comes from an ordered chain of [`ContentSource`]s:
//! 1. Curated pool, each template served at most once per user
//! 2. Generative provider, under a bounded time budget
//! 3. Built-in templates, which always answer
//!
//! A source that has nothing to offer, errors, times out or produces blank
//! fields is skipped. [`ContentResolver::resolve`] therefore never fails.
//!
//! The pool's "pick then mark seen" is a read-then-write: two concurrent
//! requests for the same user can both pick the same template. At-most-once
//! per user is best effort.

use crate::clock::DayKey;
use crate::db::Store;
use crate::models::{Goal, MissionContent, PoolServing, Tone};
use crate::services::openai::{GenerationError, OpenAiClient};
use crate::services::templates;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Inputs for choosing a mission.
#[derive(Debug, Clone, Copy)]
pub struct ContentRequest<'a> {
    pub user_id: &'a str,
    pub goal: Goal,
    pub tone: Tone,
    pub day: &'a DayKey,
    /// Tasks to avoid repeating, most recent first.
    pub recent_tasks: &'a [String],
}

/// One tier of the content waterfall.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Tier name for logs.
    fn name(&self) -> &'static str;

    /// Time budget for one attempt. `None` means unbounded.
    fn budget(&self) -> Option<Duration> {
        None
    }

    /// `Ok(None)` when this tier has no candidate for the request.
    async fn try_resolve(
        &self,
        request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>>;
}

// ─── Tier 1: Curated Pool ────────────────────────────────────

/// Serves unseen curated templates and records them as seen.
pub struct PoolSource {
    db: Arc<dyn Store>,
}

impl PoolSource {
    pub fn new(db: Arc<dyn Store>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentSource for PoolSource {
    fn name(&self) -> &'static str {
        "pool"
    }

    async fn try_resolve(
        &self,
        request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>> {
        let Some(template) = self
            .db
            .first_unseen_pool_template(request.user_id, request.goal, request.tone)
            .await?
        else {
            return Ok(None);
        };

        // Mark before returning so the template is not offered again, even
        // when its content turns out to be unusable.
        self.db
            .mark_pool_template_seen(&PoolServing {
                user_id: request.user_id.to_string(),
                pool_mission_id: template.id.clone(),
                served_day: request.day.clone(),
            })
            .await?;

        tracing::debug!(
            user_id = request.user_id,
            template_id = %template.id,
            "Serving curated pool template"
        );

        Ok(Some(template.content()))
    }
}

// ─── Tier 2: Generative Provider ─────────────────────────────

/// Asks the generative provider for a fresh mission.
pub struct GenerativeSource {
    client: OpenAiClient,
    budget: Duration,
}

impl GenerativeSource {
    pub fn new(client: OpenAiClient, budget: Duration) -> Self {
        Self { client, budget }
    }
}

#[async_trait]
impl ContentSource for GenerativeSource {
    fn name(&self) -> &'static str {
        "generative"
    }

    fn budget(&self) -> Option<Duration> {
        Some(self.budget)
    }

    async fn try_resolve(
        &self,
        request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>> {
        let content = self
            .client
            .generate_mission(request.goal, request.tone, request.recent_tasks)
            .await?;
        Ok(Some(content))
    }
}

// ─── Tier 3: Built-in Templates ──────────────────────────────

/// Picks from the static per-goal table, avoiding recent tasks when possible.
pub struct TemplateSource;

impl TemplateSource {
    pub fn pick(request: &ContentRequest<'_>) -> MissionContent {
        templates::pick_template(request.goal, request.recent_tasks, &mut rand::thread_rng())
            .content(request.tone)
    }
}

#[async_trait]
impl ContentSource for TemplateSource {
    fn name(&self) -> &'static str {
        "templates"
    }

    async fn try_resolve(
        &self,
        request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>> {
        Ok(Some(Self::pick(request)))
    }
}

// ─── Resolver ────────────────────────────────────────────────

/// Runs the content waterfall.
pub struct ContentResolver {
    sources: Vec<Box<dyn ContentSource>>,
}

impl ContentResolver {
    /// Resolver over an explicit chain, tried in order.
    pub fn new(sources: Vec<Box<dyn ContentSource>>) -> Self {
        Self { sources }
    }

    /// Production chain: pool, then generative (when configured), then templates.
    pub fn standard(db: Arc<dyn Store>, generative: Option<GenerativeSource>) -> Self {
        let mut sources: Vec<Box<dyn ContentSource>> = vec![Box::new(PoolSource::new(db))];
        if let Some(generative) = generative {
            sources.push(Box::new(generative));
        }
        sources.push(Box::new(TemplateSource));
        Self::new(sources)
    }

    /// Resolve content for a mission. Always returns complete content.
    pub async fn resolve(&self, request: &ContentRequest<'_>) -> MissionContent {
        for source in &self.sources {
            let tier = source.name();
            let attempt = source.try_resolve(request);
            let outcome = match source.budget() {
                Some(budget) => match tokio::time::timeout(budget, attempt).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(GenerationError::Timeout(budget).into()),
                },
                None => attempt.await,
            };

            match outcome {
                Ok(Some(content)) if content.is_complete() => {
                    tracing::info!(user_id = request.user_id, tier, "Mission content resolved");
                    return content;
                }
                Ok(Some(_)) => {
                    tracing::warn!(tier, "Content source returned blank fields, falling through");
                }
                Ok(None) => {
                    tracing::debug!(tier, "Content source had no candidate");
                }
                Err(e) => {
                    tracing::warn!(tier, error = %e, "Content source failed, falling through");
                }
            }
        }

        // Only reachable with a chain that lacks TemplateSource.
        TemplateSource::pick(request)
    }
}
