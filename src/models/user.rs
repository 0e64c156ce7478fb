// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use crate::clock::DayKey;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What the user is working toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Fitness,
    Productivity,
    Language,
    JobSearch,
    Custom,
}

impl Goal {
    pub const ALL: [Goal; 5] = [
        Goal::Fitness,
        Goal::Productivity,
        Goal::Language,
        Goal::JobSearch,
        Goal::Custom,
    ];

    /// Wire/storage representation (matches the serde name).
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Fitness => "fitness",
            Goal::Productivity => "productivity",
            Goal::Language => "language",
            Goal::JobSearch => "job-search",
            Goal::Custom => "custom",
        }
    }

    /// Short description used when prompting the generative provider.
    pub fn description(&self) -> &'static str {
        match self {
            Goal::Fitness => "physical health, exercise, nutrition, and body wellness",
            Goal::Productivity => "time management, focus, work habits, and getting things done",
            Goal::Language => "learning a new language through daily practice",
            Goal::JobSearch => "finding a new job, resume building, networking, and interviews",
            Goal::Custom => "a personal goal the user is working toward",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice used for the motivational line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "packages/shared/src/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Sassy,
    Kind,
    DrillSergeant,
    Zen,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Sassy, Tone::Kind, Tone::DrillSergeant, Tone::Zen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Sassy => "sassy",
            Tone::Kind => "kind",
            Tone::DrillSergeant => "drill-sergeant",
            Tone::Zen => "zen",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tone::Sassy => "witty, teasing, playfully roasting, like a brutally honest best friend",
            Tone::Kind => "warm, encouraging, supportive, like a gentle mentor",
            Tone::DrillSergeant => "commanding, no-nonsense, intense, like a military coach",
            Tone::Zen => "calm, philosophical, meditative, like a wise monk",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application user stored in Firestore.
///
/// Invariant: `streak_count == 0` whenever `last_completed_day` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal user id (also used as document ID)
    pub id: String,
    /// Identity provider subject. Set once at registration, never reassigned.
    pub auth_id: Option<String>,
    /// Email from the identity token (may be None if not shared)
    pub email: Option<String>,
    pub goal: Goal,
    pub tone: Tone,
    #[serde(default)]
    pub is_premium: bool,
    /// IANA timezone name. Advisory only, day keys are computed server-side.
    pub timezone: String,
    #[serde(default)]
    pub streak_count: u32,
    pub last_completed_day: Option<DayKey>,
    pub last_generated_day: Option<DayKey>,
    /// RFC3339
    pub created_at: String,
    /// RFC3339
    pub updated_at: String,
}
