//! Park endpoints. Browsing is public; mutations are admin-gated by the
//! access table.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::models::{NewPark, Park};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

/// List all parks - GET /api/parks
pub async fn list_parks(State(state): State<AppState>) -> Result<Json<Vec<Park>>, ApiError> {
    let parks = state.db.list_parks()?;
    Ok(Json(parks))
}

/// Get a park by id - GET /api/parks/:park_id
pub async fn get_park(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
) -> Result<Json<Park>, ApiError> {
    state
        .db
        .get_park(park_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Couldn't find park with id: {park_id}")))
}

/// Create a park - POST /api/parks
///
/// Activities embedded in the payload are created with the park.
pub async fn create_park(
    State(state): State<AppState>,
    Json(payload): Json<NewPark>,
) -> Result<(StatusCode, Json<Park>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if payload.location.trim().is_empty() {
        return Err(ApiError::BadRequest("Location is required".to_string()));
    }
    if payload.activities.iter().any(|a| a.price < 0.0) {
        return Err(ApiError::BadRequest(
            "Ticket price must be a non-negative value".to_string(),
        ));
    }

    let park = state.db.create_park(&payload)?;
    state.db.create_activities(park.id, &payload.activities)?;

    info!("✅ Created park: {} ({})", park.name, park.id);

    Ok((StatusCode::CREATED, Json(park)))
}

/// Update a park - PUT /api/parks/:park_id
pub async fn update_park(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
    Json(payload): Json<NewPark>,
) -> Result<String, ApiError> {
    let updated = state.db.update_park(park_id, &payload)?;

    if !updated {
        return Err(ApiError::NotFound(format!(
            "Couldn't find park with id: {park_id}"
        )));
    }

    Ok("Park updated successfully.".to_string())
}

/// Soft-delete a park - DELETE /api/parks/:park_id
pub async fn delete_park(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
) -> Result<String, ApiError> {
    let deleted = state.db.soft_delete_park(park_id)?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Couldn't find park with id: {park_id}"
        )));
    }

    Ok("Park deleted successfully.".to_string())
}
