//! Access Control Table
//! Mission: Declare route access rules as data, evaluated first-match-wins
//!
//! Unmatched requests require authentication with any role.

use crate::auth::models::Role;
use axum::http::Method;

/// What a matched rule demands of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity needed.
    Public,
    /// An authenticated identity whose role satisfies the given one.
    Role(Role),
    /// Any authenticated identity.
    Authenticated,
}

/// One row of the access table. `method: None` matches every method.
///
/// Patterns match on `/`-separated segments: `*` matches exactly one
/// segment, a trailing `**` matches any remainder (including none).
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    pub method: Option<&'static str>,
    pub pattern: &'static str,
    pub access: Access,
}

impl AccessRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .method
            .map_or(true, |m| m.eq_ignore_ascii_case(method.as_str()));
        method_ok && path_matches(self.pattern, path)
    }
}

/// Outcome of evaluating the table for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    /// Protected route, no identity established.
    RequireAuth,
    /// Identity present but its role does not satisfy the rule.
    Forbidden,
}

const RULES: &[AccessRule] = &[
    // Public surface: login, registration, and read-only browsing.
    AccessRule { method: Some("POST"), pattern: "/auth/login", access: Access::Public },
    AccessRule { method: Some("POST"), pattern: "/api/users/register", access: Access::Public },
    AccessRule { method: Some("GET"), pattern: "/health", access: Access::Public },
    AccessRule { method: Some("GET"), pattern: "/api/parks", access: Access::Public },
    AccessRule { method: Some("GET"), pattern: "/api/parks/*", access: Access::Public },
    AccessRule { method: Some("GET"), pattern: "/api/activities/**", access: Access::Public },
    AccessRule { method: Some("GET"), pattern: "/api/reviews/park/**", access: Access::Public },
    // Admin: park/activity mutations and the full user listing.
    AccessRule { method: Some("GET"), pattern: "/api/users/all", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("POST"), pattern: "/api/parks/**", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("PUT"), pattern: "/api/parks/**", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("DELETE"), pattern: "/api/parks/**", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("PUT"), pattern: "/api/activities", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("POST"), pattern: "/api/activities/park/**", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("POST"), pattern: "/api/activities/bulk/park/**", access: Access::Role(Role::Admin) },
    AccessRule { method: Some("DELETE"), pattern: "/api/activities/park/**", access: Access::Role(Role::Admin) },
    // User self-service: own profile, reviews, tickets, addresses.
    AccessRule { method: Some("GET"), pattern: "/api/users/currentUser", access: Access::Role(Role::User) },
    AccessRule { method: Some("PUT"), pattern: "/api/users/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("DELETE"), pattern: "/api/users/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("POST"), pattern: "/api/reviews/park/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("PUT"), pattern: "/api/reviews/park/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("DELETE"), pattern: "/api/reviews/park/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("GET"), pattern: "/api/reviews/**", access: Access::Role(Role::User) },
    AccessRule { method: None, pattern: "/api/user/*/tickets/**", access: Access::Role(Role::User) },
    AccessRule { method: None, pattern: "/api/addresses/users/**", access: Access::Role(Role::User) },
    AccessRule { method: Some("POST"), pattern: "/api/addresses/bulk/users/**", access: Access::Role(Role::User) },
];

/// The route access table, in evaluation order.
pub fn access_rules() -> &'static [AccessRule] {
    RULES
}

/// Evaluate the table for a request. `role` is the authenticated role,
/// if any identity was established.
pub fn decide(method: &Method, path: &str, role: Option<Role>) -> Decision {
    let access = access_rules()
        .iter()
        .find(|rule| rule.matches(method, path))
        .map(|rule| rule.access)
        .unwrap_or(Access::Authenticated);

    match access {
        Access::Public => Decision::Permit,
        Access::Authenticated => match role {
            Some(_) => Decision::Permit,
            None => Decision::RequireAuth,
        },
        Access::Role(required) => match role {
            None => Decision::RequireAuth,
            Some(held) if held.grants(required) => Decision::Permit,
            Some(_) => Decision::Forbidden,
        },
    }
}

/// Segment-wise pattern match. `*` consumes one segment, a trailing
/// `**` consumes the rest (possibly nothing).
fn path_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segs = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segs = path.split('/').filter(|s| !s.is_empty());

    loop {
        match pattern_segs.next() {
            None => return path_segs.next().is_none(),
            Some("**") => return true,
            Some(expected) => match path_segs.next() {
                Some(actual) if expected == "*" || expected == actual => continue,
                _ => return false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_pattern_segments() {
        assert!(path_matches("/api/parks", "/api/parks"));
        assert!(!path_matches("/api/parks", "/api/parks/3"));

        assert!(path_matches("/api/parks/*", "/api/parks/3"));
        assert!(!path_matches("/api/parks/*", "/api/parks"));
        assert!(!path_matches("/api/parks/*", "/api/parks/3/extra"));

        assert!(path_matches("/api/parks/**", "/api/parks"));
        assert!(path_matches("/api/parks/**", "/api/parks/3"));
        assert!(path_matches("/api/parks/**", "/api/parks/3/anything/else"));

        assert!(path_matches("/api/user/*/tickets/**", "/api/user/abc/tickets"));
        assert!(path_matches("/api/user/*/tickets/**", "/api/user/abc/tickets/7"));
        assert!(!path_matches("/api/user/*/tickets/**", "/api/user/abc/reviews/7"));
    }

    #[test]
    fn test_public_browsing_needs_no_identity() {
        assert_eq!(decide(&Method::GET, "/api/parks", None), Decision::Permit);
        assert_eq!(decide(&Method::GET, "/api/parks/12", None), Decision::Permit);
        assert_eq!(
            decide(&Method::GET, "/api/reviews/park/12", None),
            Decision::Permit
        );
        assert_eq!(
            decide(&Method::POST, "/auth/login", None),
            Decision::Permit
        );
    }

    #[test]
    fn test_park_mutation_is_admin_only() {
        assert_eq!(
            decide(&Method::POST, "/api/parks", None),
            Decision::RequireAuth
        );
        assert_eq!(
            decide(&Method::POST, "/api/parks", Some(Role::User)),
            Decision::Forbidden
        );
        assert_eq!(
            decide(&Method::POST, "/api/parks", Some(Role::Admin)),
            Decision::Permit
        );
        assert_eq!(
            decide(&Method::DELETE, "/api/parks/9", Some(Role::User)),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Review browsing is public by the earlier GET rule even though a
        // later rule restricts /api/reviews/** to users.
        assert_eq!(
            decide(&Method::GET, "/api/reviews/park/3", None),
            Decision::Permit
        );
        // Review mutation on the same prefix hits the USER rule.
        assert_eq!(
            decide(&Method::POST, "/api/reviews/park/3/user/u1", None),
            Decision::RequireAuth
        );
    }

    #[test]
    fn test_admin_satisfies_user_rules() {
        assert_eq!(
            decide(&Method::GET, "/api/user/u1/tickets", Some(Role::Admin)),
            Decision::Permit
        );
        assert_eq!(
            decide(&Method::GET, "/api/users/all", Some(Role::User)),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_unmatched_routes_default_to_authenticated() {
        assert_eq!(
            decide(&Method::GET, "/api/users/9b1deb4d", None),
            Decision::RequireAuth
        );
        assert_eq!(
            decide(&Method::GET, "/api/users/9b1deb4d", Some(Role::User)),
            Decision::Permit
        );
        assert_eq!(
            decide(&Method::GET, "/metrics", None),
            Decision::RequireAuth
        );
    }
}
