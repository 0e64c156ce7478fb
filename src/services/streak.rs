// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-streak arithmetic and milestone detection.

use crate::clock::DayKey;

/// Outcome of recording a completion against a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub new_streak: u32,
    pub was_reset: bool,
}

/// Compute the streak after a completion on `today`.
///
/// - already completed today: unchanged (re-completion is a no-op)
/// - last completed yesterday: +1
/// - anything else (gap, never completed, or a key from the future): reset to 1
pub fn compute_streak(
    last_completed: Option<&DayKey>,
    current_streak: u32,
    today: &DayKey,
    yesterday: &DayKey,
) -> StreakUpdate {
    match last_completed {
        Some(day) if day == today => StreakUpdate {
            new_streak: current_streak,
            was_reset: false,
        },
        Some(day) if day == yesterday => StreakUpdate {
            new_streak: current_streak.saturating_add(1),
            was_reset: false,
        },
        _ => StreakUpdate {
            new_streak: 1,
            was_reset: true,
        },
    }
}

/// Celebratory thresholds. Only an exact match fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Week,
    Month,
}

impl Milestone {
    pub fn days(&self) -> u32 {
        match self {
            Milestone::Week => 7,
            Milestone::Month => 30,
        }
    }
}

/// Milestone reached by a streak of exactly `streak` days, if any.
pub fn milestone(streak: u32) -> Option<Milestone> {
    match streak {
        7 => Some(Milestone::Week),
        30 => Some(Milestone::Month),
        _ => None,
    }
}
