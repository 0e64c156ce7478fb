// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile, preferences, streak)
//! - Daily missions (one document per user per day key)
//! - Mission pool (curated templates) and the per-user "seen" join

use crate::clock::DayKey;
use crate::db::{collections, DbError, Store};
use crate::models::{Goal, Mission, PoolServing, PoolTemplate, Tone, User};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fields written by a profile edit.
const PROFILE_FIELDS: [&str; 5] = ["email", "goal", "tone", "timezone", "updated_at"];

/// Fields written by a reroll.
const REROLL_FIELDS: [&str; 4] = [
    "task",
    "motivational_line",
    "reflection_prompt",
    "reroll_count",
];

#[derive(Serialize, Deserialize)]
struct GeneratedDayPatch {
    last_generated_day: DayKey,
    updated_at: String,
}

#[derive(Serialize, Deserialize)]
struct StreakPatch {
    streak_count: u32,
    last_completed_day: DayKey,
    updated_at: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, DbError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| DbError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, DbError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            DbError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Template ids this user has already been served.
    async fn seen_pool_ids(&self, user_id: &str) -> Result<HashSet<String>, DbError> {
        let user_id = user_id.to_string();
        let servings: Vec<PoolServing> = self
            .client
            .fluent()
            .select()
            .from(collections::USER_POOL_MISSIONS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(backend)?;

        Ok(servings.into_iter().map(|s| s.pool_mission_id).collect())
    }

    /// Field-masked write to an existing user document.
    async fn patch_user<T>(&self, user_id: &str, fields: &[&str], patch: &T) -> Result<(), DbError>
    where
        T: Serialize + for<'de> Deserialize<'de> + Send + Sync,
    {
        let _: () = self
            .client
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(user_id)
            .object(patch)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Read a mission, check it with `accept`, and write `fields` of the
    /// mission it returns, all in one transaction.
    ///
    /// Returns `false` (and writes nothing) when the mission is missing or
    /// `accept` declines it.
    async fn guarded_mission_write<F>(
        &self,
        mission_id: &str,
        fields: &[&str],
        accept: F,
    ) -> Result<bool, DbError>
    where
        F: FnOnce(Mission) -> Option<Mission> + Send,
    {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| DbError::Backend(format!("Failed to begin transaction: {}", e)))?;

        // Reading through the transaction registers the document for
        // conflict detection
        let in_transaction = self.client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let current: Option<Mission> = in_transaction
            .fluent()
            .select()
            .by_id_in(collections::DAILY_MISSIONS)
            .obj()
            .one(mission_id)
            .await
            .map_err(|e| DbError::Backend(format!("Failed to read mission in transaction: {}", e)))?;

        let Some(updated) = current.and_then(accept) else {
            let _ = transaction.rollback().await;
            return Ok(false);
        };

        self.client
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::DAILY_MISSIONS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(mission_id)
            .object(&updated)
            .add_to_transaction(&mut transaction)
            .map_err(|e| DbError::Backend(format!("Failed to add mission to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| DbError::Backend(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }
}

fn backend(err: FirestoreError) -> DbError {
    DbError::Backend(err.to_string())
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(backend)
    }

    async fn find_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, DbError> {
        let auth_id = auth_id.to_string();
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("auth_id").eq(auth_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(backend)?;

        Ok(users.into_iter().next())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), DbError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), DbError> {
        self.patch_user(&user.id, &PROFILE_FIELDS, user).await
    }

    async fn set_last_generated_day(
        &self,
        user_id: &str,
        day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError> {
        let patch = GeneratedDayPatch {
            last_generated_day: day.clone(),
            updated_at: updated_at.to_string(),
        };
        self.patch_user(user_id, &["last_generated_day", "updated_at"], &patch)
            .await
    }

    async fn record_streak(
        &self,
        user_id: &str,
        streak_count: u32,
        last_completed_day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError> {
        let patch = StreakPatch {
            streak_count,
            last_completed_day: last_completed_day.clone(),
            updated_at: updated_at.to_string(),
        };
        self.patch_user(
            user_id,
            &["streak_count", "last_completed_day", "updated_at"],
            &patch,
        )
        .await
    }

    // ─── Mission Operations ──────────────────────────────────────

    async fn get_mission(&self, mission_id: &str) -> Result<Option<Mission>, DbError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::DAILY_MISSIONS)
            .obj()
            .one(mission_id)
            .await
            .map_err(backend)
    }

    async fn insert_mission(&self, mission: &Mission) -> Result<(), DbError> {
        let result: Result<(), FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::DAILY_MISSIONS)
            .document_id(&mission.id)
            .object(mission)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(()),
            // Firestore reports ALREADY_EXISTS on create as a data conflict
            Err(FirestoreError::DataConflictError(_)) => {
                Err(DbError::AlreadyExists(mission.id.clone()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn apply_reroll(
        &self,
        rerolled: &Mission,
        expected_reroll_count: u32,
    ) -> Result<bool, DbError> {
        let mission_id = rerolled.id.clone();
        let rerolled = rerolled.clone();
        self.guarded_mission_write(&mission_id, &REROLL_FIELDS, move |current| {
            (!current.completed && current.reroll_count == expected_reroll_count)
                .then_some(rerolled)
        })
        .await
    }

    async fn mark_mission_completed(
        &self,
        mission_id: &str,
        reflection_answer: Option<&str>,
    ) -> Result<bool, DbError> {
        let answer = reflection_answer.map(str::to_string);
        self.guarded_mission_write(
            mission_id,
            &["completed", "reflection_answer"],
            move |mut current| {
                if current.completed {
                    return None;
                }
                current.completed = true;
                current.reflection_answer = answer;
                Some(current)
            },
        )
        .await
    }

    async fn recent_missions(&self, user_id: &str, limit: u32) -> Result<Vec<Mission>, DbError> {
        let user_id = user_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::DAILY_MISSIONS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([("day", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(backend)
    }

    // ─── Mission Pool Operations ─────────────────────────────────

    async fn first_unseen_pool_template(
        &self,
        user_id: &str,
        goal: Goal,
        tone: Tone,
    ) -> Result<Option<PoolTemplate>, DbError> {
        let seen = self.seen_pool_ids(user_id).await?;

        // Firestore has no NOT IN subquery; filter the (goal, tone) slice client-side.
        let candidates: Vec<PoolTemplate> = self
            .client
            .fluent()
            .select()
            .from(collections::MISSION_POOL)
            .filter(move |q| {
                q.for_all([
                    q.field("goal").eq(goal.as_str()),
                    q.field("tone").eq(tone.as_str()),
                ])
            })
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(backend)?;

        Ok(candidates.into_iter().find(|t| !seen.contains(&t.id)))
    }

    async fn mark_pool_template_seen(&self, serving: &PoolServing) -> Result<(), DbError> {
        let doc_id = PoolServing::doc_id(&serving.user_id, &serving.pool_mission_id);
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USER_POOL_MISSIONS)
            .document_id(&doc_id)
            .object(serving)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn add_pool_template(&self, template: &PoolTemplate) -> Result<(), DbError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::MISSION_POOL)
            .document_id(&template.id)
            .object(template)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn count_pool_templates(&self, goal: Goal, tone: Tone) -> Result<usize, DbError> {
        let templates: Vec<PoolTemplate> = self
            .client
            .fluent()
            .select()
            .from(collections::MISSION_POOL)
            .filter(move |q| {
                q.for_all([
                    q.field("goal").eq(goal.as_str()),
                    q.field("tone").eq(tone.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(backend)?;

        Ok(templates.len())
    }
}
