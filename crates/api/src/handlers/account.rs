//! # Account Handlers
//!
//! Registration, login and the owner's profile. Sessions are opaque tokens
//! stored through the [`AccountStore`](miny_core::store::AccountStore) port.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use miny_core::{
    errors::{FieldErrors, MinyError},
    models::user::{
        DismissRequest, LoginRequest, LoginResponse, NewUser, ProfileResponse, RegisterRequest,
        User,
    },
    slug::{slugify, with_random_suffix},
    validation::{exceeds_text_limit, too_long_message},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::{self, CurrentUser},
        error_handling::AppError,
    },
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const SLUG_ATTEMPTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub share_url: String,
}

impl MeResponse {
    fn new(user: User, public_url: &str) -> Self {
        let share_url = format!("{}/{}", public_url.trim_end_matches('/'), user.slug);
        Self {
            profile: user.into(),
            share_url,
        }
    }
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), MinyError> {
    let mut errors = FieldErrors::new();
    let name = payload.name.trim();
    if name.is_empty() {
        errors.push("name", "Name is required");
    } else if exceeds_text_limit(name) {
        errors.push("name", too_long_message());
    }
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        errors.push("email", "A valid email address is required");
    } else if exceeds_text_limit(email) {
        errors.push("email", too_long_message());
    }
    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            "password",
            format!("Password must have at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
    errors.into_result()
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MeResponse>), AppError> {
    validate_registration(&payload)?;

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if state.accounts.find_user_by_email(&email).await?.is_some() {
        return Err(MinyError::validation("email", "This email is already registered").into());
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let base = slugify(&name);
    let mut candidate = base.clone();

    for _ in 0..SLUG_ATTEMPTS {
        if !state.accounts.slug_exists(&candidate).await? {
            let created = state
                .accounts
                .create_user(NewUser {
                    name: name.clone(),
                    email: email.clone(),
                    slug: candidate.clone(),
                    password_hash: password_hash.clone(),
                })
                .await?;
            if let Some(user) = created {
                info!(user_id = %user.id, slug = %user.slug, "Registered user");
                return Ok((StatusCode::CREATED, Json(MeResponse::new(user, &state.public_url))));
            }
        }
        candidate = with_random_suffix(&base);
    }

    warn!(%base, "Could not find a free slug");
    Err(MinyError::Conflict("Could not reserve a share link, please try again".to_string()).into())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || MinyError::Authentication("Invalid email or password".to_string());

    let user = state
        .accounts
        .find_user_by_email(payload.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid().into());
    }

    state.accounts.record_login(user.id).await?;

    let now = state.clock.now();
    let purged = state.accounts.purge_expired_sessions(now).await?;
    if purged > 0 {
        debug!(purged, "Removed expired sessions");
    }

    let token = Uuid::new_v4().simple().to_string();
    let expires_at = now + state.session_ttl;
    state
        .accounts
        .create_session(&token, user.id, expires_at)
        .await?;

    let user = state
        .accounts
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| MinyError::NotFound(format!("User with ID {} not found", user.id)))?;

    info!(user_id = %user.id, "User signed in");
    Ok(Json(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<StatusCode, AppError> {
    state.accounts.delete_session(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    let profile = state
        .accounts
        .find_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| MinyError::NotFound(format!("User with ID {} not found", user.user_id)))?;
    Ok(Json(MeResponse::new(profile, &state.public_url)))
}

#[axum::debug_handler]
pub async fn dismiss_banner(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<DismissRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let profile = state
        .accounts
        .dismiss_banner(user.user_id, payload.banner)
        .await?
        .ok_or_else(|| MinyError::NotFound(format!("User with ID {} not found", user.user_id)))?;
    Ok(Json(MeResponse::new(profile, &state.public_url)))
}
