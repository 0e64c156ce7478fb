// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-window clock.
//!
//! Missions and streaks are keyed by a discrete "day key" instead of a
//! timestamp. In production a window is one UTC calendar day (`YYYY-MM-DD`).
//! Setting `DAY_WINDOW_MINUTES` switches to fixed-size `dev-<index>` windows
//! for accelerated testing.
//!
//! The mobile client derives its own day key for local cache reconciliation,
//! so both sides must run with the same window size. The server cannot detect
//! a mismatch; it only guarantees that its own keys are authoritative.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Opaque, totally ordered identifier of one issuance/streak window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Window size used to bucket wall-clock time into day keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayWindow {
    /// One UTC calendar day, keyed `YYYY-MM-DD`.
    Calendar,
    /// Fixed windows of N minutes, keyed `dev-<index>` with the index
    /// zero-padded so keys order like the windows they name.
    Minutes(u32),
}

impl DayWindow {
    /// `0` means calendar days.
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes == 0 {
            DayWindow::Calendar
        } else {
            DayWindow::Minutes(minutes)
        }
    }

    /// Day key of the window containing `at`.
    pub fn key_at(&self, at: DateTime<Utc>) -> DayKey {
        match *self {
            DayWindow::Calendar => DayKey(at.format("%Y-%m-%d").to_string()),
            DayWindow::Minutes(minutes) => dev_key(window_index(at, minutes)),
        }
    }

    /// Day key of the window immediately before the one containing `at`.
    pub fn previous_key_at(&self, at: DateTime<Utc>) -> DayKey {
        match *self {
            DayWindow::Calendar => self.key_at(at - Duration::days(1)),
            DayWindow::Minutes(minutes) => dev_key(window_index(at, minutes) - 1),
        }
    }
}

/// Width of the padded window index. One-minute windows stay within it
/// for the next million years.
const DEV_INDEX_WIDTH: usize = 12;

/// Indices are non-negative for any time after the Unix epoch.
fn dev_key(index: i64) -> DayKey {
    DayKey(format!("dev-{index:0width$}", width = DEV_INDEX_WIDTH))
}

fn window_index(at: DateTime<Utc>, minutes: u32) -> i64 {
    at.timestamp_millis()
        .div_euclid(i64::from(minutes) * MILLIS_PER_MINUTE)
}

/// Source of "today" and "yesterday" for the whole service.
#[derive(Debug, Clone, Copy)]
pub struct DayClock {
    window: DayWindow,
    /// Fixed instant used instead of the wall clock (tests only).
    pinned: Option<DateTime<Utc>>,
}

impl DayClock {
    pub fn new(window: DayWindow) -> Self {
        Self {
            window,
            pinned: None,
        }
    }

    /// A clock that always reports the window containing `at`.
    pub fn pinned_at(window: DayWindow, at: DateTime<Utc>) -> Self {
        Self {
            window,
            pinned: Some(at),
        }
    }

    pub fn window(&self) -> DayWindow {
        self.window
    }

    fn now(&self) -> DateTime<Utc> {
        self.pinned.unwrap_or_else(Utc::now)
    }

    pub fn today(&self) -> DayKey {
        self.window.key_at(self.now())
    }

    pub fn yesterday(&self) -> DayKey {
        self.window.previous_key_at(self.now())
    }
}

/// Wall-clock RFC3339 stamp (`Z` suffix) for `created_at`/`updated_at`.
///
/// Record timestamps are informational and never feed day keys.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
