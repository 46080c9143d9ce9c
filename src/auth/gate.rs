//! Authentication Gate
//! Mission: Establish per-request identity and enforce route access

use crate::api::routes::AppState;
use crate::auth::models::AuthContext;
use crate::auth::rules::{decide, Decision};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

/// Authentication middleware. Establishes the request's security
/// context when a valid bearer token is presented and always continues
/// the chain; a missing or bad token just leaves the request
/// unauthenticated for the authorization step to judge.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthContext>().is_none() {
        if let Some(token) = bearer_token(&req) {
            match state.tokens.verify(&token) {
                Ok(claims) => match state.users.get_user_by_username(&claims.sub) {
                    Ok(Some(user)) if user.is_enabled() => {
                        req.extensions_mut().insert(AuthContext {
                            user_id: user.id,
                            username: user.username,
                            role: user.role,
                        });
                    }
                    Ok(_) => {
                        debug!(subject = %claims.sub, "Token subject unknown or disabled");
                    }
                    Err(e) => {
                        warn!("Credential store lookup failed: {:#}", e);
                    }
                },
                Err(e) => {
                    debug!("Token rejected: {}", e);
                }
            }
        }
    }

    next.run(req).await
}

/// Authorization middleware. Consults the access table with the
/// context the gate established; unauthenticated requests to protected
/// routes get the 401 entry-point response, insufficient roles get a
/// plain 403.
pub async fn authorize(req: Request, next: Next) -> Response {
    let role = req.extensions().get::<AuthContext>().map(|ctx| ctx.role);

    match decide(req.method(), req.uri().path(), role) {
        Decision::Permit => next.run(req).await,
        Decision::RequireAuth => {
            unauthorized("authentication is required to access this resource")
        }
        Decision::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions").into_response(),
    }
}

/// Entry-point response for unauthenticated access to a protected
/// route.
pub fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, format!("Access denied: {reason}")).into_response()
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_auth_header(value: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/api/parks");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(&request_with_auth_header(Some("Bearer abc.def.ghi"))),
            Some("abc.def.ghi".to_string())
        );

        // Missing header and non-Bearer schemes are treated alike.
        assert_eq!(bearer_token(&request_with_auth_header(None)), None);
        assert_eq!(
            bearer_token(&request_with_auth_header(Some("Basic dXNlcjpwYXNz"))),
            None
        );
        assert_eq!(
            bearer_token(&request_with_auth_header(Some("bearer abc"))),
            None
        );
    }

    #[test]
    fn test_unauthorized_response_shape() {
        let response = unauthorized("no identity");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
