// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity binding between provider tokens and internal users.
//!
//! Tokens are HS256 JWTs issued by the hosted auth provider. The provider
//! subject (`sub`) is bound to at most one internal user through
//! `User::auth_id`. A verified caller without a bound user is "not yet
//! registered" rather than rejected; registration is explicit.

use crate::db::Store;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Claims we read from provider tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Provider user id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    pub aud: String,
}

/// A caller whose token has been verified.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub auth_id: String,
    pub email: Option<String>,
    /// Internal user id, `None` until the caller registers.
    pub user_id: Option<String>,
}

impl AuthUser {
    /// Internal user id, or `UserNotFound` for unregistered callers.
    pub fn require_user_id(&self) -> Result<&str, AppError> {
        self.user_id.as_deref().ok_or(AppError::UserNotFound)
    }
}

/// Verifies provider tokens and resolves them to internal users.
pub struct IdentityService {
    decoding_key: DecodingKey,
    validation: Validation,
    db: Arc<dyn Store>,
}

impl IdentityService {
    pub fn new(secret: &[u8], audience: &str, db: Arc<dyn Store>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            db,
        }
    }

    /// Check signature, expiry and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::InvalidToken
            })
    }

    /// Verify `token` and look up the bound internal user.
    ///
    /// Lookup failures are logged and treated as "not yet registered" so a
    /// flaky store does not lock callers out of registration.
    pub async fn resolve(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = self.verify(token)?;

        let user_id = match self.db.find_user_by_auth_id(&claims.sub).await {
            Ok(user) => user.map(|u| u.id),
            Err(e) => {
                tracing::warn!(auth_id = %claims.sub, error = %e, "User lookup failed, treating as unregistered");
                None
            }
        };

        Ok(AuthUser {
            auth_id: claims.sub,
            email: claims.email,
            user_id,
        })
    }
}

/// Sign a provider-style token. Used by tests and local tooling.
pub fn create_token(
    auth_id: &str,
    email: Option<&str>,
    audience: &str,
    secret: &[u8],
    ttl_secs: i64,
) -> anyhow::Result<String> {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;

    let claims = Claims {
        sub: auth_id.to_string(),
        email: email.map(str::to_string),
        exp: usize::try_from(exp.max(0))?,
        aud: audience.to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}
