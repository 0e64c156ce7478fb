// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use sassy_coach::clock::{DayClock, DayKey, DayWindow};
use sassy_coach::config::Config;
use sassy_coach::db::{FirestoreDb, MemoryDb, Store};
use sassy_coach::models::MissionContent;
use sassy_coach::routes::create_router;
use sassy_coach::services::content::{ContentRequest, ContentSource, PoolSource, TemplateSource};
use sassy_coach::services::identity::create_token;
use sassy_coach::services::ContentResolver;
use sassy_coach::AppState;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Day every test app considers "today".
#[allow(dead_code)]
pub const TODAY: &str = "2026-03-15";
#[allow(dead_code)]
pub const YESTERDAY: &str = "2026-03-14";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Stand-in for the generative provider: unique, well-formed content.
pub struct FakeGenerator {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ContentSource for FakeGenerator {
    fn name(&self) -> &'static str {
        "fake-generator"
    }

    async fn try_resolve(
        &self,
        request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(MissionContent {
            task: format!("Generated {} mission #{n}", request.goal),
            motivational_line: format!("A {} nudge.", request.tone),
            reflection_prompt: "What did you learn?".to_string(),
        }))
    }
}

/// Generative provider that is down.
#[allow(dead_code)]
pub struct BrokenGenerator;

#[async_trait]
impl ContentSource for BrokenGenerator {
    fn name(&self) -> &'static str {
        "broken-generator"
    }

    async fn try_resolve(
        &self,
        _request: &ContentRequest<'_>,
    ) -> anyhow::Result<Option<MissionContent>> {
        anyhow::bail!("provider returned HTTP 503")
    }
}

/// A running test app backed by an in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub generator_calls: Arc<AtomicUsize>,
}

/// Clock pinned inside [`TODAY`].
#[allow(dead_code)]
pub fn test_clock() -> DayClock {
    DayClock::pinned_at(
        DayWindow::Calendar,
        Utc.with_ymd_and_hms(2026, 3, 15, 9, 30, 0).unwrap(),
    )
}

/// Pool, then a fake generator, then built-in templates.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_on(MemoryDb::new(), test_clock())
}

/// Standard chain over an existing store, with a chosen clock.
#[allow(dead_code)]
pub fn create_test_app_on(db: MemoryDb, clock: DayClock) -> TestApp {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = FakeGenerator {
        calls: calls.clone(),
    };
    let store: Arc<dyn Store> = Arc::new(db.clone());
    let sources: Vec<Box<dyn ContentSource>> = vec![
        Box::new(PoolSource::new(store)),
        Box::new(generator),
        Box::new(TemplateSource),
    ];
    let mut app = create_test_app_with(db, clock, sources);
    app.generator_calls = calls;
    app
}

/// Test app with an explicit content chain.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: MemoryDb,
    clock: DayClock,
    sources: Vec<Box<dyn ContentSource>>,
) -> TestApp {
    let config = Config::test_default();
    let state = Arc::new(AppState::with_parts(
        config,
        Arc::new(db.clone()),
        ContentResolver::new(sources),
        clock,
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        generator_calls: Arc::new(AtomicUsize::new(0)),
    }
}

/// Provider-style token for `auth_id`, valid for an hour.
#[allow(dead_code)]
pub fn token_for(auth_id: &str) -> String {
    let config = Config::test_default();
    let email = format!("{auth_id}@example.com");
    create_token(
        auth_id,
        Some(email.as_str()),
        &config.auth_jwt_audience,
        &config.auth_jwt_secret,
        3600,
    )
    .unwrap()
}

impl TestApp {
    /// Send a request and return status plus parsed JSON body (Null if empty).
    #[allow(dead_code)]
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register `auth_id` with the given goal and tone; returns the internal user id.
    #[allow(dead_code)]
    pub async fn register(&self, auth_id: &str, goal: &str, tone: &str) -> String {
        let token = token_for(auth_id);
        let (status, body) = self
            .send(
                "POST",
                "/register",
                Some(&token),
                Some(serde_json::json!({ "goal": goal, "tone": tone, "timezone": "Europe/Berlin" })),
            )
            .await;
        assert!(status.is_success(), "register failed: {status} {body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    /// Overwrite a user's streak state directly in the store.
    #[allow(dead_code)]
    pub async fn set_streak(&self, user_id: &str, streak: u32, last_completed: Option<&str>) {
        let mut user = self.db.get_user(user_id).await.unwrap().unwrap();
        user.streak_count = streak;
        user.last_completed_day = last_completed.map(DayKey::new);
        self.db.upsert_user(&user).await.unwrap();
    }
}
