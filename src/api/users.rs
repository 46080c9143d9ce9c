//! User account endpoints: registration, profile CRUD, current-user
//! lookup, and the admin-only full listing.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::models::{AuthContext, RegisterRequest, Role, UserResponse};
use crate::auth::user_store::{NewUser, UserUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Register a new user - POST /api/users/register
///
/// Always creates a USER-role account; admins are provisioned out of
/// band. Addresses sent with the registration are stored alongside.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if payload.full_name.trim().len() < 4 {
        return Err(ApiError::BadRequest(
            "Full name must be at least 4 characters long".to_string(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if payload.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("Phone number is required".to_string()));
    }

    if state.users.get_user_by_username(&payload.username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let user = state.users.create_user(
        &NewUser {
            full_name: payload.full_name,
            username: payload.username,
            password: payload.password,
            phone: payload.phone,
            email: payload.email,
        },
        Role::User,
    )?;

    for address in &payload.addresses {
        state.db.create_address(&user.id, address)?;
    }

    info!("✅ Registered user: {}", user.username);

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Get current authenticated username - GET /api/users/currentUser
pub async fn current_user(ctx: Option<Extension<AuthContext>>) -> Result<String, ApiError> {
    let Extension(ctx) =
        ctx.ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
    Ok(ctx.username)
}

/// List all users - GET /api/users/all (admin only, via the access table)
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list_users()?;
    let response = users.iter().map(UserResponse::from_user).collect();
    Ok(Json(response))
}

/// Get a user by id - GET /api/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .get_user_by_id(&user_id)?
        .filter(|u| !u.deleted)
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {user_id}")))?;

    Ok(Json(UserResponse::from_user(&user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password: Option<String>,
}

/// Update a user profile - PUT /api/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<String, ApiError> {
    if let Some(password) = &payload.password {
        if password.len() < 8 {
            return Err(ApiError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
    }

    let updated = state.users.update_user(
        &user_id,
        &UserUpdate {
            full_name: payload.full_name,
            phone: payload.phone,
            email: payload.email,
            password: payload.password,
        },
    )?;

    if !updated {
        return Err(ApiError::NotFound(format!(
            "Couldn't find user with id: {user_id}"
        )));
    }

    Ok("User updated successfully.".to_string())
}

/// Soft-delete a user - DELETE /api/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<String, ApiError> {
    let deleted = state.users.soft_delete_user(&user_id)?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Couldn't find user with id: {user_id}"
        )));
    }

    Ok("User deleted successfully.".to_string())
}
