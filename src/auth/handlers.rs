use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, UserResponse},
        jwt::{AuthUser, JwtKeys},
        password::{check_strength, hash_password, verify_password},
        repo,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// `@`-prefixed, trimmed, lowercased; the store's unique index works on
/// this normalized form.
fn normalize_username(raw: &str) -> String {
    format!("@{raw}").trim().to_lowercase()
}

fn required_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (username, password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(ApiError::Validation(
            "Please provide username and password.".to_string(),
        )),
    }
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (raw_username, password) = required_credentials(payload.username, payload.password)?;
    let username = normalize_username(&raw_username);

    if repo::find_by_username(&state.db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::Conflict(
            "User already registered, choose a new username".to_string(),
        ));
    }

    let failed_rules = check_strength(&password);
    if !failed_rules.is_empty() {
        warn!(%username, "weak password rejected");
        return Err(ApiError::WeakPassword(failed_rules));
    }

    let hashed = hash_password(&password)?;
    let user = repo::insert(&state.db, &username, &hashed).await?;
    let user_id = user
        .id
        .ok_or_else(|| anyhow::anyhow!("insert returned no id"))?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user_id)?;

    info!(user_id = %user_id, %username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            access_token,
            user: PublicUser {
                id: user_id.to_hex(),
                name: user.username,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (raw_username, password) = required_credentials(payload.username, payload.password)?;
    let username = normalize_username(&raw_username);

    let user = repo::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| {
            warn!(%username, "login for unknown user");
            ApiError::NotFound("User does not exist".to_string())
        })?;

    if !verify_password(&password, &user.password)? {
        warn!(%username, "login with incorrect password");
        return Err(ApiError::Auth("Incorrect password".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| anyhow::anyhow!("user document missing _id"))?;
    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user_id)?;

    info!(user_id = %user_id, %username, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        access_token,
        user: PublicUser {
            id: user_id.to_hex(),
            name: user.username,
        },
    }))
}

/// Stateless by design: the credential stays valid until natural expiry,
/// the client just drops its copy.
#[instrument]
async fn logout(AuthUser(user_id): AuthUser) -> Json<serde_json::Value> {
    info!(%user_id, "user logged out");
    Json(serde_json::json!({ "message": "Logout successful" }))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "token subject no longer exists");
            ApiError::NotFound("User does not exist".to_string())
        })?;
    Ok(Json(UserResponse::try_from(user)?))
}
