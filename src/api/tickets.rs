//! Ticket endpoints, scoped under /api/user/:user_id/tickets.
//!
//! Update and delete verify the ticket belongs to the path user;
//! cancelled tickets read as not found.

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::models::Ticket;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

/// Get all tickets of a user - GET /api/user/:user_id/tickets
pub async fn get_tickets(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    ensure_user_exists(&state, &user_id)?;

    let tickets = state.db.list_tickets(&user_id)?;
    if tickets.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No tickets found for User with ID {user_id}"
        )));
    }

    Ok(Json(tickets))
}

/// Get one ticket - GET /api/user/:user_id/tickets/:ticket_id
pub async fn get_ticket(
    State(state): State<AppState>,
    Path((user_id, ticket_id)): Path<(Uuid, i64)>,
) -> Result<Json<Ticket>, ApiError> {
    ensure_user_exists(&state, &user_id)?;

    let ticket = state
        .db
        .get_ticket(ticket_id)?
        .filter(|t| !t.cancelled)
        .ok_or_else(|| ApiError::NotFound(format!("Ticket with ID {ticket_id} not found")))?;

    Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketQuery {
    #[serde(rename = "parkId")]
    pub park_id: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct TicketBody {
    pub purchase_date: Option<String>,
}

/// Buy a ticket - POST /api/user/:user_id/tickets?parkId=N
pub async fn create_ticket(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CreateTicketQuery>,
    Json(payload): Json<TicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    ensure_user_exists(&state, &user_id)?;

    state
        .db
        .get_park(query.park_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Park with ID {} not found", query.park_id)))?;

    let purchase_date = payload
        .purchase_date
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let ticket = state.db.create_ticket(&user_id, query.park_id, &purchase_date)?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Update a ticket - PUT /api/user/:user_id/tickets/:ticket_id
pub async fn update_ticket(
    State(state): State<AppState>,
    Path((user_id, ticket_id)): Path<(Uuid, i64)>,
    Json(payload): Json<TicketBody>,
) -> Result<String, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    let ticket = owned_ticket(&state, &user_id, ticket_id)?;

    if ticket.cancelled {
        return Err(ApiError::NotFound(format!(
            "Cancelled Ticket with ID {ticket_id} cannot be updated"
        )));
    }

    let purchase_date = payload
        .purchase_date
        .unwrap_or_else(|| ticket.purchase_date.clone());
    state.db.update_ticket(ticket_id, &purchase_date)?;

    Ok("Ticket updated successfully.".to_string())
}

/// Cancel a ticket - DELETE /api/user/:user_id/tickets/:ticket_id
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path((user_id, ticket_id)): Path<(Uuid, i64)>,
) -> Result<String, ApiError> {
    ensure_user_exists(&state, &user_id)?;
    owned_ticket(&state, &user_id, ticket_id)?;

    state.db.cancel_ticket(ticket_id)?;

    Ok("Ticket cancelled successfully.".to_string())
}

fn ensure_user_exists(state: &AppState, user_id: &Uuid) -> Result<(), ApiError> {
    state
        .users
        .get_user_by_id(user_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("User with ID {user_id} not found")))
}

/// Fetch a ticket and confirm it belongs to the path user.
fn owned_ticket(state: &AppState, user_id: &Uuid, ticket_id: i64) -> Result<Ticket, ApiError> {
    let ticket = state
        .db
        .get_ticket(ticket_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Ticket with ID {ticket_id} not found")))?;

    if ticket.user_id != *user_id {
        return Err(ApiError::NotFound(format!(
            "Ticket with ID {ticket_id} does not belong to User with ID {user_id}"
        )));
    }

    Ok(ticket)
}
