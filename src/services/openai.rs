// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generative mission provider (OpenAI chat-completions, JSON mode).
//!
//! Handles:
//! - Prompt construction from goal, tone and recent tasks
//! - Strict parsing of the JSON reply (malformed or partial output is an error)
//! - Batch generation for seeding the curated pool

use crate::models::{Goal, MissionContent, Tone};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const MISSION_TEMPERATURE: f64 = 0.9;
const MISSION_MAX_TOKENS: u32 = 300;
const BATCH_TEMPERATURE: f64 = 0.95;
const BATCH_MAX_TOKENS: u32 = 2000;
/// Upper bound on stored response bodies in error messages.
const MAX_ERROR_BODY: usize = 300;

/// Generative provider failures. None of these reach API clients.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider request failed: {0}")]
    Http(String),

    #[error("provider rate limit hit (429)")]
    RateLimited,

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned an empty response")]
    Empty,

    #[error("provider returned malformed JSON: {0}")]
    Malformed(String),

    #[error("provider response missing required fields")]
    MissingFields,

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

/// Mission shape the model is asked to produce.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedMission {
    #[serde(default)]
    task: String,
    #[serde(default)]
    sass: String,
    #[serde(default)]
    reflection_question: String,
}

impl GeneratedMission {
    fn into_content(self) -> Result<MissionContent, GenerationError> {
        let content = MissionContent {
            task: self.task.trim().to_string(),
            motivational_line: self.sass.trim().to_string(),
            reflection_prompt: self.reflection_question.trim().to_string(),
        };
        if content.is_complete() {
            Ok(content)
        } else {
            Err(GenerationError::MissingFields)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedBatch {
    #[serde(default)]
    missions: Vec<GeneratedMission>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client whose requests are cut off after `timeout`.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Generate one mission, asking the model to avoid `recent_tasks`.
    ///
    /// Avoidance is best-effort; the model may still repeat a task.
    pub async fn generate_mission(
        &self,
        goal: Goal,
        tone: Tone,
        recent_tasks: &[String],
    ) -> Result<MissionContent, GenerationError> {
        let raw = self
            .chat_json(
                &mission_system_prompt(goal, tone),
                &mission_user_prompt(recent_tasks),
                MISSION_TEMPERATURE,
                MISSION_MAX_TOKENS,
            )
            .await?;
        parse_generated_mission(&raw)
    }

    /// Generate `count` distinct missions for seeding the curated pool.
    pub async fn generate_batch(
        &self,
        goal: Goal,
        tone: Tone,
        count: usize,
    ) -> Result<Vec<MissionContent>, GenerationError> {
        let user_prompt = format!(
            "Generate {count} unique daily missions for the \"{goal}\" goal in the \"{tone}\" tone."
        );
        let raw = self
            .chat_json(
                &batch_system_prompt(goal, tone, count),
                &user_prompt,
                BATCH_TEMPERATURE,
                BATCH_MAX_TOKENS,
            )
            .await?;
        parse_generated_batch(&raw)
    }

    /// Send one system+user exchange in JSON mode and return the reply text.
    async fn chat_json(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        tracing::debug!(model = %self.model, "Calling generative provider");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                tracing::warn!("Generative provider rate limit hit (429)");
                return Err(GenerationError::RateLimited);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::Empty)
    }
}

fn mission_system_prompt(goal: Goal, tone: Tone) -> String {
    format!(
        r#"You are Sassy Coach, a daily accountability coach inside a mobile app.
You generate ONE small, actionable daily mission for the user.

Your personality for this user is: {tone_desc}

Rules:
- The task must be completable in under 30 minutes
- The task must be specific and concrete (not vague)
- The task must relate to the user's goal: {goal_desc}
- The sass/motivation message should be 1-2 sentences in the {tone} tone
- The reflection question should be thoughtful and help the user process what they did
- Never suggest anything extreme, unsafe, or requiring purchases
- Do NOT repeat any of the recent tasks listed below

Respond in JSON format only:
{{
  "task": "max 20 words, the specific daily mission",
  "sass": "max 25 words, the motivation message in the chosen tone",
  "reflectionQuestion": "max 20 words, a thoughtful reflection question"
}}"#,
        tone_desc = tone.description(),
        goal_desc = goal.description(),
    )
}

fn mission_user_prompt(recent_tasks: &[String]) -> String {
    if recent_tasks.is_empty() {
        return "Generate the user's first daily mission.".to_string();
    }

    let listed: Vec<String> = recent_tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect();
    format!(
        "Generate a new daily mission. Avoid repeating these recent tasks:\n{}",
        listed.join("\n")
    )
}

fn batch_system_prompt(goal: Goal, tone: Tone, count: usize) -> String {
    format!(
        r#"You are Sassy Coach, a daily accountability coach.
Generate {count} unique daily missions as a JSON array.

Your personality is: {tone_desc}
Goal area: {goal_desc}

Rules:
- Each task must be completable in under 30 minutes
- Each task must be specific and concrete (not vague)
- The sass/motivation message should be 1-2 sentences in the {tone} tone
- The reflection question should be thoughtful
- Never suggest anything extreme, unsafe, or requiring purchases
- All {count} missions must be DIFFERENT from each other

Respond with a JSON object:
{{
  "missions": [
    {{
      "task": "max 20 words",
      "sass": "max 25 words in {tone} tone",
      "reflectionQuestion": "max 20 words"
    }}
  ]
}}"#,
        tone_desc = tone.description(),
        goal_desc = goal.description(),
    )
}

/// Parse a single-mission reply. Blank or missing fields are rejected.
pub fn parse_generated_mission(raw: &str) -> Result<MissionContent, GenerationError> {
    let parsed: GeneratedMission =
        serde_json::from_str(raw).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    parsed.into_content()
}

/// Parse a batch reply, dropping incomplete entries.
pub fn parse_generated_batch(raw: &str) -> Result<Vec<MissionContent>, GenerationError> {
    let parsed: GeneratedBatch =
        serde_json::from_str(raw).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let missions: Vec<MissionContent> = parsed
        .missions
        .into_iter()
        .filter_map(|m| m.into_content().ok())
        .collect();

    if missions.is_empty() {
        return Err(GenerationError::MissingFields);
    }
    Ok(missions)
}
