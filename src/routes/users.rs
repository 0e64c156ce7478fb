// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and profile routes.

use crate::clock::timestamp_now;
use crate::error::{AppError, Result};
use crate::models::{Goal, Tone, User};
use crate::routes::extract::ValidatedJson;
use crate::services::AuthUser;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/user", get(get_user).put(update_user))
}

/// User profile as seen by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub goal: Goal,
    pub tone: Tone,
    pub is_premium: bool,
    pub timezone: String,
    pub streak_count: u32,
    pub last_completed_day: Option<String>,
    pub last_generated_day: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            goal: user.goal,
            tone: user.tone,
            is_premium: user.is_premium,
            timezone: user.timezone,
            streak_count: user.streak_count,
            last_completed_day: user.last_completed_day.map(|d| d.to_string()),
            last_generated_day: user.last_generated_day.map(|d| d.to_string()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

// ─── Registration ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct RegisterRequest {
    pub goal: Goal,
    pub tone: Tone,
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
}

/// Create or update the user bound to the caller's identity.
///
/// Updates write only the profile fields, so streak and day fields are
/// kept. The email always mirrors the token, including clearing it when the
/// token carries none. Answers 201 on create, 200 on update.
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>)> {
    let now = timestamp_now();

    // Re-check the binding here: the middleware treats lookup failures as
    // "unregistered", which must not turn into a second user row.
    let existing = state.db.find_user_by_auth_id(&caller.auth_id).await?;

    let (user, status) = match existing {
        Some(mut user) => {
            user.goal = req.goal;
            user.tone = req.tone;
            user.timezone = req.timezone;
            user.email = caller.email.clone();
            user.updated_at = now;
            state.db.update_profile(&user).await?;
            (user, StatusCode::OK)
        }
        None => {
            let user = User {
                id: format!("user-{}", uuid::Uuid::new_v4().simple()),
                auth_id: Some(caller.auth_id.clone()),
                email: caller.email.clone(),
                goal: req.goal,
                tone: req.tone,
                is_premium: false,
                timezone: req.timezone,
                streak_count: 0,
                last_completed_day: None,
                last_generated_day: None,
                created_at: now.clone(),
                updated_at: now,
            };
            state.db.upsert_user(&user).await?;
            (user, StatusCode::CREATED)
        }
    };

    tracing::info!(
        user_id = %user.id,
        created = status == StatusCode::CREATED,
        goal = %user.goal,
        tone = %user.tone,
        "User registered"
    );

    Ok((status, Json(UserEnvelope { user: user.into() })))
}

// ─── Profile ─────────────────────────────────────────────────

async fn load_caller(state: &AppState, caller: &AuthUser) -> Result<User> {
    let user_id = caller.require_user_id()?;
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::UserNotFound)
}

/// Get the caller's profile. 404 until registered.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserEnvelope>> {
    let user = load_caller(&state, &caller).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
pub struct UpdateUserRequest {
    pub goal: Option<Goal>,
    pub tone: Option<Tone>,
    #[validate(length(min = 1, max = 64))]
    pub timezone: Option<String>,
}

/// Partial update of goal, tone and timezone.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>> {
    let mut user = load_caller(&state, &caller).await?;

    if let Some(goal) = req.goal {
        user.goal = goal;
    }
    if let Some(tone) = req.tone {
        user.tone = tone;
    }
    if let Some(timezone) = req.timezone {
        user.timezone = timezone;
    }
    user.updated_at = timestamp_now();

    state.db.update_profile(&user).await?;
    tracing::debug!(user_id = %user.id, "User preferences updated");

    Ok(Json(UserEnvelope { user: user.into() }))
}
