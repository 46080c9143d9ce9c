//! Authentication API Endpoints
//! Mission: Exchange credentials for signed bearer tokens

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::{LoginRequest, LoginResponse};
use axum::{extract::State, Json};
use tracing::{info, warn};

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let valid = state
        .users
        .verify_password(&payload.username, &payload.password)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let user = state
        .users
        .get_user_by_username(&payload.username)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let (token, expires_in) = state.tokens.issue(&user)?;

    info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

    Ok(Json(LoginResponse {
        username: user.username,
        token,
        expires_in,
    }))
}
