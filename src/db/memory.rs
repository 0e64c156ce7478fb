// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same semantics as the Firestore layout.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests. State is
//! lost on restart.

use crate::clock::DayKey;
use crate::db::{DbError, Store};
use crate::models::{Goal, Mission, PoolServing, PoolTemplate, Tone, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    users: DashMap<String, User>,
    missions: DashMap<String, Mission>,
    pool: DashMap<String, PoolTemplate>,
    /// Keyed by [`PoolServing::doc_id`]
    servings: DashMap<String, PoolServing>,
}

/// In-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of missions stored for a user (all days).
    pub fn mission_count(&self, user_id: &str) -> usize {
        self.tables
            .missions
            .iter()
            .filter(|m| m.user_id == user_id)
            .count()
    }

    fn user_mut(
        &self,
        user_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, User>, DbError> {
        self.tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| DbError::Backend(format!("User {user_id} not found")))
    }
}

#[async_trait]
impl Store for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        Ok(self.tables.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, DbError> {
        Ok(self
            .tables
            .users
            .iter()
            .find(|u| u.auth_id.as_deref() == Some(auth_id))
            .map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), DbError> {
        self.tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), DbError> {
        let mut stored = self.user_mut(&user.id)?;
        stored.email = user.email.clone();
        stored.goal = user.goal;
        stored.tone = user.tone;
        stored.timezone = user.timezone.clone();
        stored.updated_at = user.updated_at.clone();
        Ok(())
    }

    async fn set_last_generated_day(
        &self,
        user_id: &str,
        day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError> {
        let mut stored = self.user_mut(user_id)?;
        stored.last_generated_day = Some(day.clone());
        stored.updated_at = updated_at.to_string();
        Ok(())
    }

    async fn record_streak(
        &self,
        user_id: &str,
        streak_count: u32,
        last_completed_day: &DayKey,
        updated_at: &str,
    ) -> Result<(), DbError> {
        let mut stored = self.user_mut(user_id)?;
        stored.streak_count = streak_count;
        stored.last_completed_day = Some(last_completed_day.clone());
        stored.updated_at = updated_at.to_string();
        Ok(())
    }

    async fn get_mission(&self, mission_id: &str) -> Result<Option<Mission>, DbError> {
        Ok(self.tables.missions.get(mission_id).map(|m| m.clone()))
    }

    async fn insert_mission(&self, mission: &Mission) -> Result<(), DbError> {
        match self.tables.missions.entry(mission.id.clone()) {
            Entry::Occupied(_) => Err(DbError::AlreadyExists(mission.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(mission.clone());
                Ok(())
            }
        }
    }

    async fn apply_reroll(
        &self,
        rerolled: &Mission,
        expected_reroll_count: u32,
    ) -> Result<bool, DbError> {
        let Some(mut stored) = self.tables.missions.get_mut(&rerolled.id) else {
            return Ok(false);
        };
        if stored.completed || stored.reroll_count != expected_reroll_count {
            return Ok(false);
        }
        stored.task = rerolled.task.clone();
        stored.motivational_line = rerolled.motivational_line.clone();
        stored.reflection_prompt = rerolled.reflection_prompt.clone();
        stored.reroll_count = rerolled.reroll_count;
        Ok(true)
    }

    async fn mark_mission_completed(
        &self,
        mission_id: &str,
        reflection_answer: Option<&str>,
    ) -> Result<bool, DbError> {
        let Some(mut stored) = self.tables.missions.get_mut(mission_id) else {
            return Ok(false);
        };
        if stored.completed {
            return Ok(false);
        }
        stored.completed = true;
        stored.reflection_answer = reflection_answer.map(str::to_string);
        Ok(true)
    }

    async fn recent_missions(&self, user_id: &str, limit: u32) -> Result<Vec<Mission>, DbError> {
        let mut missions: Vec<Mission> = self
            .tables
            .missions
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.clone())
            .collect();
        missions.sort_by(|a, b| b.day.cmp(&a.day));
        missions.truncate(limit as usize);
        Ok(missions)
    }

    async fn first_unseen_pool_template(
        &self,
        user_id: &str,
        goal: Goal,
        tone: Tone,
    ) -> Result<Option<PoolTemplate>, DbError> {
        let mut candidates: Vec<PoolTemplate> = self
            .tables
            .pool
            .iter()
            .filter(|t| t.goal == goal && t.tone == tone)
            .filter(|t| {
                !self
                    .tables
                    .servings
                    .contains_key(&PoolServing::doc_id(user_id, &t.id))
            })
            .map(|t| t.clone())
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(candidates.into_iter().next())
    }

    async fn mark_pool_template_seen(&self, serving: &PoolServing) -> Result<(), DbError> {
        self.tables.servings.insert(
            PoolServing::doc_id(&serving.user_id, &serving.pool_mission_id),
            serving.clone(),
        );
        Ok(())
    }

    async fn add_pool_template(&self, template: &PoolTemplate) -> Result<(), DbError> {
        self.tables
            .pool
            .insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn count_pool_templates(&self, goal: Goal, tone: Tone) -> Result<usize, DbError> {
        Ok(self
            .tables
            .pool
            .iter()
            .filter(|t| t.goal == goal && t.tone == tone)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissionContent;

    fn mission(user_id: &str, day: &str) -> Mission {
        Mission::new(
            user_id,
            DayKey::new(day),
            MissionContent {
                task: format!("task {day}"),
                motivational_line: "go".to_string(),
                reflection_prompt: "why?".to_string(),
            },
        )
    }

    fn template(id: &str, goal: Goal, tone: Tone) -> PoolTemplate {
        PoolTemplate {
            id: id.to_string(),
            goal,
            tone,
            task: format!("pool {id}"),
            motivational_line: "line".to_string(),
            reflection_prompt: "prompt".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_mission_insert_is_rejected() {
        let db = MemoryDb::new();
        let first = mission("u1", "2026-01-01");
        db.insert_mission(&first).await.unwrap();

        let mut second = mission("u1", "2026-01-01");
        second.task = "different".to_string();
        let err = db.insert_mission(&second).await.unwrap_err();
        assert!(matches!(err, DbError::AlreadyExists(_)));

        let stored = db.get_mission(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.task, first.task);
        assert_eq!(db.mission_count("u1"), 1);
    }

    #[tokio::test]
    async fn recent_missions_are_newest_first_and_scoped() {
        let db = MemoryDb::new();
        for day in ["2026-01-01", "2026-01-03", "2026-01-02"] {
            db.insert_mission(&mission("u1", day)).await.unwrap();
        }
        db.insert_mission(&mission("u2", "2026-01-04")).await.unwrap();

        let recent = db.recent_missions("u1", 2).await.unwrap();
        let days: Vec<&str> = recent.iter().map(|m| m.day.as_str()).collect();
        assert_eq!(days, vec!["2026-01-03", "2026-01-02"]);
    }

    #[tokio::test]
    async fn reroll_applies_only_to_the_state_it_was_read_from() {
        let db = MemoryDb::new();
        let original = mission("u1", "2026-01-01");
        db.insert_mission(&original).await.unwrap();

        let mut rerolled = original.clone();
        rerolled.task = "rerolled".to_string();
        rerolled.reroll_count = 1;
        assert!(db.apply_reroll(&rerolled, 0).await.unwrap());

        // A second reroll built from the stale read loses
        let mut stale = original.clone();
        stale.task = "stale".to_string();
        stale.reroll_count = 1;
        assert!(!db.apply_reroll(&stale, 0).await.unwrap());
        assert_eq!(
            db.get_mission(&original.id).await.unwrap().unwrap().task,
            "rerolled"
        );

        // Completed missions are never rerolled
        assert!(db
            .mark_mission_completed(&original.id, Some("done"))
            .await
            .unwrap());
        let mut late = rerolled.clone();
        late.task = "late".to_string();
        late.reroll_count = 2;
        assert!(!db.apply_reroll(&late, 1).await.unwrap());

        let stored = db.get_mission(&original.id).await.unwrap().unwrap();
        assert!(stored.completed);
        assert_eq!(stored.reflection_answer.as_deref(), Some("done"));
        assert_eq!(stored.task, "rerolled");
    }

    #[tokio::test]
    async fn completion_is_written_once() {
        let db = MemoryDb::new();
        let m = mission("u1", "2026-01-01");
        db.insert_mission(&m).await.unwrap();

        assert!(db.mark_mission_completed(&m.id, Some("first")).await.unwrap());
        assert!(!db.mark_mission_completed(&m.id, Some("second")).await.unwrap());
        assert!(!db.mark_mission_completed("missing", None).await.unwrap());

        let stored = db.get_mission(&m.id).await.unwrap().unwrap();
        assert_eq!(stored.reflection_answer.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn field_updates_leave_other_user_fields_alone() {
        let db = MemoryDb::new();
        let user = User {
            id: "u1".to_string(),
            auth_id: Some("a1".to_string()),
            email: None,
            goal: Goal::Fitness,
            tone: Tone::Sassy,
            is_premium: false,
            timezone: "UTC".to_string(),
            streak_count: 2,
            last_completed_day: Some(DayKey::new("2026-01-01")),
            last_generated_day: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        db.upsert_user(&user).await.unwrap();

        let mut edited = user.clone();
        edited.tone = Tone::Zen;
        edited.streak_count = 0;
        edited.last_completed_day = None;
        db.update_profile(&edited).await.unwrap();
        db.set_last_generated_day("u1", &DayKey::new("2026-01-02"), "t1")
            .await
            .unwrap();
        db.record_streak("u1", 3, &DayKey::new("2026-01-02"), "t2")
            .await
            .unwrap();

        let stored = db.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.tone, Tone::Zen);
        assert_eq!(stored.streak_count, 3);
        assert_eq!(stored.last_completed_day, Some(DayKey::new("2026-01-02")));
        assert_eq!(stored.last_generated_day, Some(DayKey::new("2026-01-02")));
        assert_eq!(stored.updated_at, "t2");

        assert!(db.record_streak("nobody", 1, &DayKey::new("2026-01-02"), "t").await.is_err());
    }

    #[tokio::test]
    async fn mission_for_day_ignores_other_owners() {
        let db = MemoryDb::new();
        let m = mission("u1", "2026-01-01");
        db.insert_mission(&m).await.unwrap();

        let day = DayKey::new("2026-01-01");
        assert!(db.mission_for_day("u1", &day).await.unwrap().is_some());
        assert!(db.mission_for_day("u2", &day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unseen_pool_templates_skip_served_ones() {
        let db = MemoryDb::new();
        db.add_pool_template(&template("b", Goal::Fitness, Tone::Zen))
            .await
            .unwrap();
        db.add_pool_template(&template("a", Goal::Fitness, Tone::Zen))
            .await
            .unwrap();
        db.add_pool_template(&template("c", Goal::Fitness, Tone::Kind))
            .await
            .unwrap();

        let first = db
            .first_unseen_pool_template("u1", Goal::Fitness, Tone::Zen)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.id, "a");

        db.mark_pool_template_seen(&PoolServing {
            user_id: "u1".to_string(),
            pool_mission_id: "a".to_string(),
            served_day: DayKey::new("2026-01-01"),
        })
        .await
        .unwrap();

        let next = db
            .first_unseen_pool_template("u1", Goal::Fitness, Tone::Zen)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.id, "b");

        // Another user still sees "a"
        let other = db
            .first_unseen_pool_template("u2", Goal::Fitness, Tone::Zen)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.id, "a");

        assert_eq!(
            db.count_pool_templates(Goal::Fitness, Tone::Zen).await.unwrap(),
            2
        );
        assert_eq!(
            db.count_pool_templates(Goal::Custom, Tone::Zen).await.unwrap(),
            0
        );
    }
}
