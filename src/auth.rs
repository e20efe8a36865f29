//! Identity collaborator: registration, login, and request extractors.
//!
//! The stores never see ambient session state; handlers receive "current
//! user id or absent" through [`AuthUser`] and [`MaybeUser`] and thread it
//! into every store call that needs it.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRequestParts, Json, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: usize,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<StatusCode> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| ApiError::Internal("password hashing failed"))?;

    let result = sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4().to_string())
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .execute(&state.db)
        .await;

    match result {
        Ok(_) => Ok(StatusCode::CREATED),
        // SQLite unique constraint violation
        Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
            Err(ApiError::Conflict("username or email already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE email = $1")
            .bind(&payload.email)
            .fetch_optional(&state.db)
            .await?;

    let Some((user_id, username, password_hash)) = user else {
        return Err(ApiError::InvalidCredentials);
    };

    let parsed_hash =
        PasswordHash::new(&password_hash).map_err(|_| ApiError::Internal("hash parse error"))?;

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&user_id, &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        token,
        user_id,
        username,
    }))
}

/// Signs a 7-day HS256 bearer token for `user_id`.
pub fn issue_token(user_id: &str, secret: &str) -> ApiResult<String> {
    let expiration = Utc::now() + Duration::days(7);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|_| ApiError::Internal("token generation failed"))
}

fn decode_user_id(token: &str, secret: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()
    .map(|data| data.claims.sub)
}

fn bearer_user_id(parts: &Parts, state: &AppState) -> Option<String> {
    let token = parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    decode_user_id(token, &state.config.jwt_secret)
}

/// Authenticated user id. Rejects the request with `Unauthenticated` when
/// the bearer token is absent or invalid. Used on write paths.
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_user_id(parts, state)
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Current user id or absent. Read paths degrade to empty results rather
/// than failing, so a missing or invalid token becomes `None`.
pub struct MaybeUser(pub Option<String>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(bearer_user_id(parts, state)))
    }
}
