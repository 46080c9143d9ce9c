use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{activities, addresses, parks, reviews, tickets, users};
use crate::auth::{api as auth_api, authenticate, authorize, TokenService, UserStore};
use crate::middleware::request_logging;
use crate::store::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub users: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
}

/// Create the API router with the full middleware stack:
/// request logging -> authentication gate -> authorization -> handlers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth_api::login))
        // Users
        .route("/api/users/register", post(users::register))
        .route("/api/users/currentUser", get(users::current_user))
        .route("/api/users/all", get(users::list_users))
        .route(
            "/api/users/:user_id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Parks
        .route("/api/parks", get(parks::list_parks).post(parks::create_park))
        .route(
            "/api/parks/:park_id",
            get(parks::get_park)
                .put(parks::update_park)
                .delete(parks::delete_park),
        )
        // Activities
        .route("/api/activities", put(activities::update_activity))
        .route("/api/activities/:park_id", get(activities::list_activities))
        .route(
            "/api/activities/park/:park_id",
            post(activities::create_activity),
        )
        .route(
            "/api/activities/bulk/park/:park_id",
            post(activities::create_activities),
        )
        .route(
            "/api/activities/park/:park_id/activity/:activity_id",
            delete(activities::delete_activity),
        )
        // Reviews
        .route("/api/reviews/park/:park_id", get(reviews::list_reviews))
        .route(
            "/api/reviews/park/:park_id/user/:user_id",
            post(reviews::create_review),
        )
        .route(
            "/api/reviews/park/:park_id/user/:user_id/review/:review_id",
            put(reviews::update_review),
        )
        .route(
            "/api/reviews/park/:park_id/user/:user_id/:review_id",
            delete(reviews::delete_review),
        )
        // Tickets
        .route(
            "/api/user/:user_id/tickets",
            get(tickets::get_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/user/:user_id/tickets/:ticket_id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        // Addresses
        .route(
            "/api/addresses/users/:user_id",
            post(addresses::create_address).get(addresses::list_addresses),
        )
        .route(
            "/api/addresses/users/:user_id/update-addresses",
            put(addresses::update_addresses),
        )
        .route(
            "/api/addresses/users/:user_id/delete-addresses/:address_id",
            delete(addresses::delete_address),
        )
        .layer(middleware::from_fn(authorize))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
