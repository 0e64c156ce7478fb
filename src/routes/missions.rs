// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mission routes: generate, reroll, complete, history.

use crate::error::Result;
use crate::models::{Goal, Mission, Tone};
use crate::routes::extract::ValidatedJson;
use crate::services::missions::history_limit;
use crate::services::AuthUser;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Mission routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-mission", post(generate_mission))
        .route("/reroll-mission", post(reroll_mission))
        .route("/complete-mission", post(complete_mission))
        .route("/history", get(history))
}

/// Mission as seen by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct MissionResponse {
    pub id: String,
    pub user_id: String,
    pub day: String,
    pub task: String,
    pub motivational_line: String,
    pub reflection_prompt: String,
    pub completed: bool,
    pub reflection_answer: Option<String>,
    pub reroll_count: u32,
}

impl From<Mission> for MissionResponse {
    fn from(mission: Mission) -> Self {
        Self {
            id: mission.id,
            user_id: mission.user_id,
            day: mission.day.to_string(),
            task: mission.task,
            motivational_line: mission.motivational_line,
            reflection_prompt: mission.reflection_prompt,
            completed: mission.completed,
            reflection_answer: mission.reflection_answer,
            reroll_count: mission.reroll_count,
        }
    }
}

/// Goal and tone for generate and reroll.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct MissionRequest {
    pub goal: Goal,
    pub tone: Tone,
}

// ─── Generate ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct GenerateMissionResponse {
    pub mission: MissionResponse,
    pub from_cache: bool,
    pub rerolls_remaining: u32,
}

/// Today's mission. 201 when created by this call, 200 when it already existed.
async fn generate_mission(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<MissionRequest>,
) -> Result<(StatusCode, Json<GenerateMissionResponse>)> {
    let user_id = caller.require_user_id()?;
    let issued = state
        .missions
        .generate_today(user_id, req.goal, req.tone)
        .await?;

    let status = if issued.from_cache {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let rerolls_remaining = issued.mission.rerolls_remaining();

    Ok((
        status,
        Json(GenerateMissionResponse {
            mission: issued.mission.into(),
            from_cache: issued.from_cache,
            rerolls_remaining,
        }),
    ))
}

// ─── Reroll ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct RerollMissionResponse {
    pub mission: MissionResponse,
    pub rerolls_remaining: u32,
}

async fn reroll_mission(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<MissionRequest>,
) -> Result<Json<RerollMissionResponse>> {
    let user_id = caller.require_user_id()?;
    let mission = state.missions.reroll(user_id, req.goal, req.tone).await?;
    let rerolls_remaining = mission.rerolls_remaining();

    Ok(Json(RerollMissionResponse {
        mission: mission.into(),
        rerolls_remaining,
    }))
}

// ─── Complete ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct CompleteMissionRequest {
    #[validate(length(min = 1, max = 256))]
    pub mission_id: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub reflection_answer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct CompleteMissionResponse {
    pub mission: MissionResponse,
    pub streak_count: u32,
    pub last_completed_date: String,
    /// 7 or 30 when this completion hit a milestone exactly
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(optional))]
    pub milestone: Option<u32>,
}

async fn complete_mission(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CompleteMissionRequest>,
) -> Result<Json<CompleteMissionResponse>> {
    let user_id = caller.require_user_id()?;
    let done = state
        .missions
        .complete(user_id, &req.mission_id, req.reflection_answer)
        .await?;

    Ok(Json(CompleteMissionResponse {
        mission: done.mission.into(),
        streak_count: done.streak_count,
        last_completed_date: done.last_completed_day.to_string(),
        milestone: done.milestone.map(|m| m.days()),
    }))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    /// Kept as text so a malformed value falls back to the default.
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct HistoryResponse {
    pub missions: Vec<MissionResponse>,
}

async fn history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let user_id = caller.require_user_id()?;
    let limit = history_limit(query.limit.and_then(|l| l.trim().parse().ok()));
    let missions = state.missions.history(user_id, limit).await?;

    Ok(Json(HistoryResponse {
        missions: missions.into_iter().map(Into::into).collect(),
    }))
}
