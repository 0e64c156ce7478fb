// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily mission model for storage.

use crate::clock::DayKey;
use serde::{Deserialize, Serialize};

/// Upper bound on rerolls per mission (1 initial + 2 rerolls = 3 contents a day).
pub const MAX_REROLLS: u32 = 2;

/// Generated content of a mission, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionContent {
    pub task: String,
    pub motivational_line: String,
    pub reflection_prompt: String,
}

impl MissionContent {
    /// True when all three fields carry non-blank text.
    pub fn is_complete(&self) -> bool {
        !self.task.trim().is_empty()
            && !self.motivational_line.trim().is_empty()
            && !self.reflection_prompt.trim().is_empty()
    }
}

/// The mission of the day for one user.
///
/// Stored at `daily_missions/{id}` where `id` is derived from
/// `(user_id, day)`, so a second insert for the same day collides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub user_id: String,
    pub day: DayKey,
    pub task: String,
    pub motivational_line: String,
    pub reflection_prompt: String,
    /// Monotonic: never goes back to false.
    #[serde(default)]
    pub completed: bool,
    pub reflection_answer: Option<String>,
    #[serde(default)]
    pub reroll_count: u32,
}

impl Mission {
    /// Canonical document id for a user's mission on `day`.
    pub fn canonical_id(user_id: &str, day: &DayKey) -> String {
        format!("mission-{}-{}", day, user_id)
    }

    /// A fresh, active mission for `(user_id, day)`.
    pub fn new(user_id: &str, day: DayKey, content: MissionContent) -> Self {
        Self {
            id: Self::canonical_id(user_id, &day),
            user_id: user_id.to_string(),
            day,
            task: content.task,
            motivational_line: content.motivational_line,
            reflection_prompt: content.reflection_prompt,
            completed: false,
            reflection_answer: None,
            reroll_count: 0,
        }
    }

    pub fn rerolls_remaining(&self) -> u32 {
        MAX_REROLLS.saturating_sub(self.reroll_count)
    }

    /// Replace the content fields, leaving state and ownership untouched.
    pub fn apply_content(&mut self, content: MissionContent) {
        self.task = content.task;
        self.motivational_line = content.motivational_line;
        self.reflection_prompt = content.reflection_prompt;
    }
}
