// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod content;
pub mod identity;
pub mod missions;
pub mod openai;
pub mod streak;
pub mod templates;

pub use content::{ContentResolver, ContentSource, GenerativeSource};
pub use identity::{AuthUser, IdentityService};
pub use missions::MissionService;
pub use openai::{GenerationError, OpenAiClient};
