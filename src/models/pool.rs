// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Curated mission pool records.

use crate::clock::DayKey;
use crate::models::{Goal, MissionContent, Tone};
use serde::{Deserialize, Serialize};

/// Pre-authored mission content keyed by (goal, tone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTemplate {
    /// Template ID (also used as document ID)
    pub id: String,
    pub goal: Goal,
    pub tone: Tone,
    pub task: String,
    pub motivational_line: String,
    pub reflection_prompt: String,
}

impl PoolTemplate {
    pub fn content(&self) -> MissionContent {
        MissionContent {
            task: self.task.clone(),
            motivational_line: self.motivational_line.clone(),
            reflection_prompt: self.reflection_prompt.clone(),
        }
    }
}

/// Join record: a pool template has been served to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolServing {
    pub user_id: String,
    pub pool_mission_id: String,
    pub served_day: DayKey,
}

impl PoolServing {
    /// Document id, one per (user, template).
    pub fn doc_id(user_id: &str, template_id: &str) -> String {
        format!("{}_{}", user_id, urlencoding::encode(template_id))
    }
}
