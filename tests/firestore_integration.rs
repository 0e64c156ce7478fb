// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running:
//!
//! ```text
//! gcloud emulators firestore start --host-port=localhost:8080
//! FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration
//! ```
//!
//! Ids are made unique per run so tests don't see each other's data.

use sassy_coach::clock::DayKey;
use sassy_coach::db::{DbError, Store};
use sassy_coach::models::{
    Goal, Mission, MissionContent, PoolServing, PoolTemplate, Tone, User,
};

mod common;
use common::test_db;

/// Suffix unique to this test invocation.
fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn test_user(id: &str, auth_id: &str) -> User {
    let now = chrono::Utc::now().to_rfc3339();
    User {
        id: id.to_string(),
        auth_id: Some(auth_id.to_string()),
        email: Some("test@example.com".to_string()),
        goal: Goal::Fitness,
        tone: Tone::Sassy,
        is_premium: false,
        timezone: "UTC".to_string(),
        streak_count: 0,
        last_completed_day: None,
        last_generated_day: None,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn content(task: &str) -> MissionContent {
    MissionContent {
        task: task.to_string(),
        motivational_line: "Move it.".to_string(),
        reflection_prompt: "How did it go?".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_roundtrip_and_auth_lookup() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let user_id = format!("user-{suffix}");
    let auth_id = format!("auth-{suffix}");

    assert!(db.get_user(&user_id).await.unwrap().is_none());
    assert!(db.find_user_by_auth_id(&auth_id).await.unwrap().is_none());

    let mut user = test_user(&user_id, &auth_id);
    db.upsert_user(&user).await.unwrap();

    let found = db.find_user_by_auth_id(&auth_id).await.unwrap().unwrap();
    assert_eq!(found.id, user_id);

    user.streak_count = 3;
    user.last_completed_day = Some(DayKey::new("2026-03-14"));
    db.upsert_user(&user).await.unwrap();

    let stored = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.streak_count, 3);
    assert_eq!(stored.last_completed_day, Some(DayKey::new("2026-03-14")));
    assert_eq!(stored.goal, Goal::Fitness);
}

// ═══════════════════════════════════════════════════════════════════════════
// MISSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_second_insert_for_same_day_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let user_id = format!("user-{}", unique_suffix());
    let day = DayKey::new("2026-03-15");

    let first = Mission::new(&user_id, day.clone(), content("First"));
    db.insert_mission(&first).await.unwrap();

    let second = Mission::new(&user_id, day.clone(), content("Second"));
    let err = db.insert_mission(&second).await.unwrap_err();
    assert!(matches!(err, DbError::AlreadyExists(_)), "got {err:?}");

    let stored = db.mission_for_day(&user_id, &day).await.unwrap().unwrap();
    assert_eq!(stored.task, "First");
}

#[tokio::test]
async fn test_guarded_reroll_and_completion() {
    require_emulator!();

    let db = test_db().await;
    let user_id = format!("user-{}", unique_suffix());
    let mission = Mission::new(&user_id, DayKey::new("2026-03-15"), content("Plank"));
    db.insert_mission(&mission).await.unwrap();

    let mut rerolled = mission.clone();
    rerolled.apply_content(content("Squats"));
    rerolled.reroll_count = 1;
    assert!(db.apply_reroll(&rerolled, 0).await.unwrap());
    // Built from a stale read
    assert!(!db.apply_reroll(&rerolled, 0).await.unwrap());

    assert!(db
        .mark_mission_completed(&mission.id, Some("Shaky"))
        .await
        .unwrap());
    assert!(!db
        .mark_mission_completed(&mission.id, Some("Again"))
        .await
        .unwrap());

    let mut late = rerolled.clone();
    late.apply_content(content("Lunges"));
    late.reroll_count = 2;
    assert!(!db.apply_reroll(&late, 1).await.unwrap());

    let stored = db.get_mission(&mission.id).await.unwrap().unwrap();
    assert_eq!(stored.task, "Squats");
    assert_eq!(stored.reroll_count, 1);
    assert!(stored.completed);
    assert_eq!(stored.reflection_answer.as_deref(), Some("Shaky"));
}

#[tokio::test]
async fn test_user_field_updates() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let user_id = format!("user-{suffix}");
    let user = test_user(&user_id, &format!("auth-{suffix}"));
    db.upsert_user(&user).await.unwrap();

    db.record_streak(&user_id, 5, &DayKey::new("2026-03-15"), "2026-03-15T09:00:00Z")
        .await
        .unwrap();
    db.set_last_generated_day(&user_id, &DayKey::new("2026-03-15"), "2026-03-15T09:01:00Z")
        .await
        .unwrap();

    // A profile edit from a stale copy leaves the streak alone
    let mut edited = user.clone();
    edited.tone = Tone::Zen;
    edited.email = None;
    db.update_profile(&edited).await.unwrap();

    let stored = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.tone, Tone::Zen);
    assert_eq!(stored.email, None);
    assert_eq!(stored.streak_count, 5);
    assert_eq!(stored.last_completed_day, Some(DayKey::new("2026-03-15")));
    assert_eq!(stored.last_generated_day, Some(DayKey::new("2026-03-15")));

    let missing = format!("user-missing-{suffix}");
    assert!(db
        .record_streak(&missing, 1, &DayKey::new("2026-03-15"), "t")
        .await
        .is_err());
}

#[tokio::test]
async fn test_recent_missions_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let user_id = format!("user-{}", unique_suffix());
    for day in ["2026-03-13", "2026-03-15", "2026-03-14"] {
        let mission = Mission::new(&user_id, DayKey::new(day), content(day));
        db.insert_mission(&mission).await.unwrap();
    }
    let other = Mission::new("someone-else", DayKey::new("2026-03-16"), content("nope"));
    let _ = db.insert_mission(&other).await;

    let recent = db.recent_missions(&user_id, 2).await.unwrap();
    let days: Vec<&str> = recent.iter().map(|m| m.day.as_str()).collect();
    assert_eq!(days, vec!["2026-03-15", "2026-03-14"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// POOL TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_pool_unseen_selection_and_count() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let user_id = format!("user-{suffix}");
    // Custom/Zen keeps this test away from templates other tests add
    let before = db.count_pool_templates(Goal::Custom, Tone::Zen).await.unwrap();

    for n in 0..2 {
        db.add_pool_template(&PoolTemplate {
            id: format!("pool-custom-zen-{suffix}-{n}"),
            goal: Goal::Custom,
            tone: Tone::Zen,
            task: format!("Breathe {n}"),
            motivational_line: "Be still.".to_string(),
            reflection_prompt: "What did you notice?".to_string(),
        })
        .await
        .unwrap();
    }

    let after = db.count_pool_templates(Goal::Custom, Tone::Zen).await.unwrap();
    assert_eq!(after, before + 2);

    // Mark every template seen; afterwards nothing is left for this user
    while let Some(template) = db
        .first_unseen_pool_template(&user_id, Goal::Custom, Tone::Zen)
        .await
        .unwrap()
    {
        db.mark_pool_template_seen(&PoolServing {
            user_id: user_id.clone(),
            pool_mission_id: template.id.clone(),
            served_day: DayKey::new("2026-03-15"),
        })
        .await
        .unwrap();
    }

    assert!(db
        .first_unseen_pool_template(&user_id, Goal::Custom, Tone::Zen)
        .await
        .unwrap()
        .is_none());

    let fresh_user = format!("user-fresh-{suffix}");
    assert!(db
        .first_unseen_pool_template(&fresh_user, Goal::Custom, Tone::Zen)
        .await
        .unwrap()
        .is_some());
}
