//! Address endpoints, scoped under /api/addresses/users/:user_id.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::models::{Address, NewAddress};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// Add an address - POST /api/addresses/users/:user_id
pub async fn create_address(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    ensure_user_exists(&state, &user_id)?;
    validate_address(&payload)?;

    let address = state.db.create_address(&user_id, &payload)?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// List a user's addresses - GET /api/addresses/users/:user_id
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Address>>, ApiError> {
    ensure_user_exists(&state, &user_id)?;

    let addresses = state.db.list_addresses(&user_id)?;
    Ok(Json(addresses))
}

/// Replace a user's address set - PUT /api/addresses/users/:user_id/update-addresses
pub async fn update_addresses(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<Vec<NewAddress>>,
) -> Result<String, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    for address in &payload {
        validate_address(address)?;
    }

    state.db.replace_addresses(&user_id, &payload)?;

    Ok("Addresses updated successfully.".to_string())
}

/// Remove an address - DELETE /api/addresses/users/:user_id/delete-addresses/:address_id
pub async fn delete_address(
    State(state): State<AppState>,
    Path((user_id, address_id)): Path<(Uuid, i64)>,
) -> Result<String, ApiError> {
    ensure_user_exists(&state, &user_id)?;

    let removed = state.db.remove_address(&user_id, address_id)?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "Address not found with ID: {address_id}"
        )));
    }

    Ok("Address removed successfully.".to_string())
}

fn ensure_user_exists(state: &AppState, user_id: &Uuid) -> Result<(), ApiError> {
    state
        .users
        .get_user_by_id(user_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {user_id}")))
}

fn validate_address(address: &NewAddress) -> Result<(), ApiError> {
    if address.city.trim().is_empty()
        || address.state.trim().is_empty()
        || address.pincode.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "City, state and pincode are required".to_string(),
        ));
    }
    Ok(())
}
