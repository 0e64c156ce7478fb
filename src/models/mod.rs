// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod mission;
pub mod pool;
pub mod user;

pub use mission::{Mission, MissionContent, MAX_REROLLS};
pub use pool::{PoolServing, PoolTemplate};
pub use user::{Goal, Tone, User};
