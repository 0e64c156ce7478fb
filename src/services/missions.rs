// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mission-of-the-day lifecycle: generate, reroll, complete, history.
//!
//! A user has at most one mission per day key. The mission id is derived
//! from `(user_id, day)` and the store rejects a second insert of the same
//! id, so concurrent `generate_today` calls converge on one document.
//!
//! Reroll and completion are conditional writes: a reroll only lands on
//! the uncompleted mission state it was computed from, and a mission is
//! completed at most once. User writes touch only the fields they own.

use crate::clock::{timestamp_now, DayClock, DayKey};
use crate::db::{DbError, Store};
use crate::error::{AppError, Result};
use crate::models::{Goal, Mission, Tone, User, MAX_REROLLS};
use crate::services::content::{ContentRequest, ContentResolver};
use crate::services::streak::{compute_streak, milestone, Milestone};
use std::sync::Arc;

/// Number of past missions whose tasks the resolver should avoid.
const RECENT_TASK_WINDOW: u32 = 7;

pub const DEFAULT_HISTORY_LIMIT: u32 = 30;
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Result of [`MissionService::generate_today`].
#[derive(Debug, Clone)]
pub struct IssuedMission {
    pub mission: Mission,
    /// True when today's mission already existed.
    pub from_cache: bool,
}

/// Result of [`MissionService::complete`].
#[derive(Debug, Clone)]
pub struct CompletedMission {
    pub mission: Mission,
    pub streak_count: u32,
    pub last_completed_day: DayKey,
    pub milestone: Option<Milestone>,
}

/// Normalize a client-supplied history limit.
///
/// Missing or non-positive values mean the default; large values are capped.
pub fn history_limit(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => u32::try_from(n)
            .unwrap_or(MAX_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT),
        _ => DEFAULT_HISTORY_LIMIT,
    }
}

fn check_rerollable(mission: &Mission) -> Result<()> {
    if mission.completed {
        return Err(AppError::AlreadyCompleted);
    }
    if mission.reroll_count >= MAX_REROLLS {
        return Err(AppError::MaxRerollsReached);
    }
    Ok(())
}

/// Orchestrates mission issuance, rerolls and completion.
pub struct MissionService {
    db: Arc<dyn Store>,
    resolver: ContentResolver,
    clock: DayClock,
}

impl MissionService {
    pub fn new(db: Arc<dyn Store>, resolver: ContentResolver, clock: DayClock) -> Self {
        Self {
            db,
            resolver,
            clock,
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    async fn recent_tasks(&self, user_id: &str) -> Result<Vec<String>> {
        let recent = self
            .db
            .recent_missions(user_id, RECENT_TASK_WINDOW)
            .await?;
        Ok(recent.into_iter().map(|m| m.task).collect())
    }

    /// Return today's mission, creating it on the first call of the day.
    pub async fn generate_today(
        &self,
        user_id: &str,
        goal: Goal,
        tone: Tone,
    ) -> Result<IssuedMission> {
        let today = self.clock.today();

        if let Some(mission) = self.db.mission_for_day(user_id, &today).await? {
            tracing::debug!(user_id, day = %today, "Returning existing mission");
            return Ok(IssuedMission {
                mission,
                from_cache: true,
            });
        }

        self.load_user(user_id).await?;
        let recent_tasks = self.recent_tasks(user_id).await?;
        let content = self
            .resolver
            .resolve(&ContentRequest {
                user_id,
                goal,
                tone,
                day: &today,
                recent_tasks: &recent_tasks,
            })
            .await;

        let mission = Mission::new(user_id, today.clone(), content);
        match self.db.insert_mission(&mission).await {
            Ok(()) => {}
            Err(DbError::AlreadyExists(_)) => {
                // Lost the race to a concurrent request; theirs is the mission of the day.
                tracing::info!(user_id, day = %today, "Concurrent generate, using stored mission");
                let existing = self
                    .db
                    .mission_for_day(user_id, &today)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database(format!("mission {} vanished after insert", mission.id))
                    })?;
                return Ok(IssuedMission {
                    mission: existing,
                    from_cache: true,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.db
            .set_last_generated_day(user_id, &today, &timestamp_now())
            .await?;

        tracing::info!(user_id, day = %today, mission_id = %mission.id, "Mission generated");

        Ok(IssuedMission {
            mission,
            from_cache: false,
        })
    }

    /// Replace today's mission content, at most [`MAX_REROLLS`] times.
    pub async fn reroll(&self, user_id: &str, goal: Goal, tone: Tone) -> Result<Mission> {
        let today = self.clock.today();

        let mission = self
            .db
            .mission_for_day(user_id, &today)
            .await?
            .ok_or(AppError::NoMission)?;
        check_rerollable(&mission)?;

        let mut recent_tasks = self.recent_tasks(user_id).await?;
        if !recent_tasks.contains(&mission.task) {
            recent_tasks.push(mission.task.clone());
        }

        let content = self
            .resolver
            .resolve(&ContentRequest {
                user_id,
                goal,
                tone,
                day: &today,
                recent_tasks: &recent_tasks,
            })
            .await;

        let expected = mission.reroll_count;
        let mut rerolled = mission;
        rerolled.apply_content(content);
        rerolled.reroll_count = expected + 1;

        if self.db.apply_reroll(&rerolled, expected).await? {
            tracing::info!(
                user_id,
                mission_id = %rerolled.id,
                reroll_count = rerolled.reroll_count,
                "Mission rerolled"
            );
            return Ok(rerolled);
        }

        // The mission changed while content was being resolved
        let current = self
            .db
            .mission_for_day(user_id, &today)
            .await?
            .ok_or(AppError::NoMission)?;
        check_rerollable(&current)?;
        tracing::info!(
            user_id,
            mission_id = %current.id,
            "Concurrent reroll, using stored mission"
        );
        Ok(current)
    }

    /// Mark a mission completed and advance the owner's streak.
    ///
    /// Completing an already-completed mission returns it unchanged. The
    /// streak still advances if today's mission is completed but the
    /// owner's streak never recorded it, which happens when an earlier
    /// call failed between the two writes.
    pub async fn complete(
        &self,
        user_id: &str,
        mission_id: &str,
        reflection_answer: Option<String>,
    ) -> Result<CompletedMission> {
        // Absent and foreign missions are indistinguishable to the caller.
        let mut mission = self
            .db
            .get_mission(mission_id)
            .await?
            .filter(|m| m.user_id == user_id)
            .ok_or(AppError::MissionNotFound)?;

        let user = self.load_user(user_id).await?;
        let today = self.clock.today();

        let mut just_completed = false;
        if !mission.completed {
            if self
                .db
                .mark_mission_completed(&mission.id, reflection_answer.as_deref())
                .await?
            {
                mission.completed = true;
                mission.reflection_answer = reflection_answer;
                just_completed = true;
            } else {
                // Completed by a concurrent request; report what it stored
                mission = self
                    .db
                    .get_mission(mission_id)
                    .await?
                    .filter(|m| m.user_id == user_id)
                    .ok_or(AppError::MissionNotFound)?;
            }
        }

        let streak_owed = user.last_completed_day.as_ref() != Some(&today)
            && (just_completed || mission.day == today);
        if !streak_owed {
            tracing::debug!(user_id, mission_id, "Streak already recorded");
            let last_completed_day = user
                .last_completed_day
                .clone()
                .unwrap_or_else(|| mission.day.clone());
            return Ok(CompletedMission {
                mission,
                streak_count: user.streak_count,
                last_completed_day,
                milestone: None,
            });
        }

        let update = compute_streak(
            user.last_completed_day.as_ref(),
            user.streak_count,
            &today,
            &self.clock.yesterday(),
        );

        self.db
            .record_streak(user_id, update.new_streak, &today, &timestamp_now())
            .await?;

        let reached = milestone(update.new_streak);
        tracing::info!(
            user_id,
            mission_id,
            streak = update.new_streak,
            was_reset = update.was_reset,
            retried = !just_completed,
            milestone = reached.map(|m| m.days()),
            "Mission completed"
        );

        Ok(CompletedMission {
            mission,
            streak_count: update.new_streak,
            last_completed_day: today,
            milestone: reached,
        })
    }

    /// A user's missions, newest day first.
    pub async fn history(&self, user_id: &str, limit: u32) -> Result<Vec<Mission>> {
        Ok(self.db.recent_missions(user_id, limit).await?)
    }
}
