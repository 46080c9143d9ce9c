//! Activity endpoints. Listing is public; mutations are admin-gated by
//! the access table.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::models::{Activity, NewActivity};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// List a park's activities - GET /api/activities/:park_id
pub async fn list_activities(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    ensure_park_exists(&state, park_id)?;
    let activities = state.db.list_activities(park_id)?;
    Ok(Json(activities))
}

/// Create an activity in a park - POST /api/activities/park/:park_id
pub async fn create_activity(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
    Json(payload): Json<NewActivity>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    ensure_park_exists(&state, park_id)?;
    validate_activity(&payload.name, &payload.description, payload.price)?;

    let activity = state.db.create_activity(park_id, &payload)?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Create several activities at once - POST /api/activities/bulk/park/:park_id
pub async fn create_activities(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
    Json(payload): Json<Vec<NewActivity>>,
) -> Result<(StatusCode, Json<Vec<Activity>>), ApiError> {
    ensure_park_exists(&state, park_id)?;
    for activity in &payload {
        validate_activity(&activity.name, &activity.description, activity.price)?;
    }

    let activities = state.db.create_activities(park_id, &payload)?;
    Ok((StatusCode::CREATED, Json(activities)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateActivityRequest {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Update an activity - PUT /api/activities
///
/// The target is addressed by the id embedded in the payload.
pub async fn update_activity(
    State(state): State<AppState>,
    Json(payload): Json<UpdateActivityRequest>,
) -> Result<String, ApiError> {
    validate_activity(&payload.name, &payload.description, payload.price)?;

    let updated =
        state
            .db
            .update_activity(payload.id, &payload.name, &payload.description, payload.price)?;

    if !updated {
        return Err(ApiError::NotFound(format!(
            "Couldn't find activity with id: {}",
            payload.id
        )));
    }

    Ok("Activity updated successfully.".to_string())
}

/// Soft-delete an activity - DELETE /api/activities/park/:park_id/activity/:activity_id
pub async fn delete_activity(
    State(state): State<AppState>,
    Path((park_id, activity_id)): Path<(i64, i64)>,
) -> Result<String, ApiError> {
    let deleted = state.db.soft_delete_activity(park_id, activity_id)?;

    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Couldn't find activity with id {activity_id} in park {park_id}"
        )));
    }

    Ok("Activity deleted successfully.".to_string())
}

fn ensure_park_exists(state: &AppState, park_id: i64) -> Result<(), ApiError> {
    state
        .db
        .get_park(park_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("Couldn't find park with id: {park_id}")))
}

fn validate_activity(name: &str, description: &str, price: f64) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if description.trim().is_empty() {
        return Err(ApiError::BadRequest("Description is required".to_string()));
    }
    if price < 0.0 {
        return Err(ApiError::BadRequest(
            "Ticket price must be a non-negative value".to_string(),
        ));
    }
    Ok(())
}
