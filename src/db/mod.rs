// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers and services talk to the [`Store`] trait. Production uses
//! [`FirestoreDb`]; [`MemoryDb`] backs local development and tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::clock::DayKey;
use crate::error::AppError;
use crate::models::{Goal, Mission, PoolServing, PoolTemplate, Tone, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const DAILY_MISSIONS: &str = "daily_missions";
    pub const MISSION_POOL: &str = "mission_pool";
    /// Join of (user, pool template) already served
    pub const USER_POOL_MISSIONS: &str = "user_pool_missions";
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Insert collided with an existing document.
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Backend(String),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Row-level access to users, missions and the curated pool.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError>;

    /// Look up the user bound to an identity provider subject.
    async fn find_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, DbError>;

    /// Write the whole user document. Used when creating a user.
    async fn upsert_user(&self, user: &User) -> Result<(), DbError>;

    /// Write only the profile fields (email, goal, tone, timezone,
    /// updated_at) of an existing user.
    async fn update_profile(&self, user: &User) -> Result<(), DbError>;

    /// Set `last_generated_day` (and `updated_at`) on an existing user.
    async fn set_last_generated_day(
        &self,
        user_id: &str,
        day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError>;

    /// Set `streak_count` and `last_completed_day` (and `updated_at`) on an
    /// existing user.
    async fn record_streak(
        &self,
        user_id: &str,
        streak_count: u32,
        last_completed_day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError>;

    // ─── Missions ────────────────────────────────────────────────

    async fn get_mission(&self, mission_id: &str) -> Result<Option<Mission>, DbError>;

    /// Create a mission. Fails with [`DbError::AlreadyExists`] if the id is taken.
    async fn insert_mission(&self, mission: &Mission) -> Result<(), DbError>;

    /// Store rerolled content and count for `rerolled.id`.
    ///
    /// Applies only while the stored mission is uncompleted and still has
    /// `expected_reroll_count` rerolls. Returns `false`, writing nothing,
    /// when it has changed since it was read.
    async fn apply_reroll(
        &self,
        rerolled: &Mission,
        expected_reroll_count: u32,
    ) -> Result<bool, DbError>;

    /// Mark a mission completed with `reflection_answer`.
    ///
    /// Returns `false`, writing nothing, if it is missing or already
    /// completed.
    async fn mark_mission_completed(
        &self,
        mission_id: &str,
        reflection_answer: Option<&str>,
    ) -> Result<bool, DbError>;

    /// Missions for a user, newest day first.
    async fn recent_missions(&self, user_id: &str, limit: u32) -> Result<Vec<Mission>, DbError>;

    /// Mission of `day` for `user_id`, looked up by its canonical id.
    async fn mission_for_day(
        &self,
        user_id: &str,
        day: &DayKey,
    ) -> Result<Option<Mission>, DbError> {
        let mission = self.get_mission(&Mission::canonical_id(user_id, day)).await?;
        Ok(mission.filter(|m| m.user_id == user_id))
    }

    // ─── Curated Pool ────────────────────────────────────────────

    /// First template for (goal, tone), in id order, not yet served to the user.
    async fn first_unseen_pool_template(
        &self,
        user_id: &str,
        goal: Goal,
        tone: Tone,
    ) -> Result<Option<PoolTemplate>, DbError>;

    async fn mark_pool_template_seen(&self, serving: &PoolServing) -> Result<(), DbError>;

    async fn add_pool_template(&self, template: &PoolTemplate) -> Result<(), DbError>;

    /// Number of curated templates for (goal, tone).
    async fn count_pool_templates(&self, goal: Goal, tone: Tone) -> Result<usize, DbError>;
}
