//! Review endpoints. Park review listings are public; mutations require
//! USER authority via the access table.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::models::{NewReview, Review};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// List a park's reviews - GET /api/reviews/park/:park_id
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(park_id): Path<i64>,
) -> Result<Json<Vec<Review>>, ApiError> {
    state
        .db
        .get_park(park_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Park with id {park_id} not found")))?;

    let reviews = state.db.list_reviews(park_id)?;
    Ok(Json(reviews))
}

/// Create a review - POST /api/reviews/park/:park_id/user/:user_id
pub async fn create_review(
    State(state): State<AppState>,
    Path((park_id, user_id)): Path<(i64, Uuid)>,
    Json(payload): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    ensure_park_and_user(&state, park_id, &user_id)?;
    validate_rating(payload.rating)?;

    let review = state
        .db
        .create_review(park_id, &user_id, payload.rating, &payload.comment)?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Update a review - PUT /api/reviews/park/:park_id/user/:user_id/review/:review_id
pub async fn update_review(
    State(state): State<AppState>,
    Path((park_id, user_id, review_id)): Path<(i64, Uuid, i64)>,
    Json(payload): Json<NewReview>,
) -> Result<String, ApiError> {
    ensure_park_and_user(&state, park_id, &user_id)?;
    validate_rating(payload.rating)?;

    let updated = state
        .db
        .update_review(review_id, payload.rating, &payload.comment)?;

    if !updated {
        return Err(ApiError::NotFound("Review Not Found".to_string()));
    }

    Ok("Review updated successfully.".to_string())
}

/// Soft-delete a review - DELETE /api/reviews/park/:park_id/user/:user_id/:review_id
pub async fn delete_review(
    State(state): State<AppState>,
    Path((park_id, user_id, review_id)): Path<(i64, Uuid, i64)>,
) -> Result<String, ApiError> {
    ensure_park_and_user(&state, park_id, &user_id)?;

    let deleted = state.db.soft_delete_review(review_id)?;
    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Review with id {review_id} not found"
        )));
    }

    Ok("Review deleted successfully.".to_string())
}

fn ensure_park_and_user(state: &AppState, park_id: i64, user_id: &Uuid) -> Result<(), ApiError> {
    state
        .db
        .get_park(park_id)?
        .ok_or_else(|| ApiError::NotFound("Park not found".to_string()))?;

    state
        .users
        .get_user_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(())
}

fn validate_rating(rating: i64) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::BadRequest(
            "Rating must be between 1 and 5 stars".to_string(),
        ));
    }
    Ok(())
}
