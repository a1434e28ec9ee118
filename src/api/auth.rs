//! Bearer-token authentication: registration, login, and the caller extractors.
//!
//! Tokens are HS256 JWTs whose `sub` is the profile id. Extractors reload the
//! profile on every request, so role changes and removed accounts take effect
//! without waiting for the token to expire.

use super::AppState;
use crate::{
    core::profile::{self, ContactUpdate, NewCustomer},
    entities::{Role, profile::Model as ProfileModel},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    role: Role,
    exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: ProfileModel,
}

/// Signs a token for `profile` valid for `ttl_hours`.
///
/// # Errors
/// Returns `Error::Token` if signing fails.
pub fn issue_token(profile: &ProfileModel, secret: &str, ttl_hours: i64) -> Result<String> {
    let claims = Claims {
        sub: profile.id,
        role: profile.role,
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Into::into)
}

fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Any signed-in caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub ProfileModel);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer(parts).ok_or(Error::Unauthorized)?;
        let claims = verify_token(token, &state.settings.jwt_secret).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            Error::Unauthorized
        })?;
        match profile::get_profile(&state.db, claims.sub).await {
            Ok(profile) => Ok(Self(profile)),
            Err(Error::ProfileNotFound { .. }) => Err(Error::Unauthorized),
            Err(e) => Err(e),
        }
    }
}

/// A signed-in caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub ProfileModel);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let AuthUser(profile) = AuthUser::from_request_parts(parts, state).await?;
        if profile.role != Role::Admin {
            return Err(Error::Forbidden);
        }
        Ok(Self(profile))
    }
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<NewCustomer>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let profile =
        profile::register_customer(&state.db, form, state.settings.password_hash_cost).await?;
    let token = issue_token(
        &profile,
        &state.settings.jwt_secret,
        state.settings.token_ttl_hours,
    )?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, profile })))
}

async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let profile = profile::authenticate(&state.db, &form.email, &form.password).await?;
    let token = issue_token(
        &profile,
        &state.settings.jwt_secret,
        state.settings.token_ttl_hours,
    )?;
    Ok(Json(AuthResponse { token, profile }))
}

async fn me(AuthUser(profile): AuthUser) -> Json<ProfileModel> {
    Json(profile)
}

async fn update_me(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    Json(changes): Json<ContactUpdate>,
) -> Result<Json<ProfileModel>> {
    Ok(Json(
        profile::update_contact(&state.db, profile.id, changes).await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/me", get(me).put(update_me))
}
