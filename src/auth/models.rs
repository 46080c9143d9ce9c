//! Authentication Models
//! Mission: Define user, role, claim, and security-context structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub wallet: f64,
    pub deleted: bool,
    pub created_at: String,
}

impl User {
    /// A user can authenticate only while not soft-deleted.
    pub fn is_enabled(&self) -> bool {
        !self.deleted
    }
}

/// Roles for route-level access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Whether this role satisfies a rule that requires `required`.
    /// ADMIN satisfies USER-level rules; the reverse does not hold.
    pub fn grants(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => matches!(self, Role::Admin),
        }
    }
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub iat: i64,    // issued-at timestamp
    pub exp: i64,    // expiration timestamp
}

/// Per-request security context, carried in axum request extensions.
///
/// Inserted by the authentication gate once the bearer token has been
/// verified and its subject resolved; absent on unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_in: i64, // seconds until expiration
}

/// Registration request body. Addresses may be attached at signup.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub addresses: Vec<crate::models::NewAddress>,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub wallet: f64,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            role: user.role,
            wallet: user.wallet,
            created_at: user.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""ADMIN""#);

        let user: Role = serde_json::from_str(r#""USER""#).unwrap();
        assert_eq!(user, Role::User);
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "ADMIN");
        assert_eq!(Role::User.as_str(), "USER");

        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("USER"), Some(Role::User));
        assert_eq!(Role::from_str("superuser"), None);
    }

    #[test]
    fn test_admin_grants_user_level_access() {
        assert!(Role::Admin.grants(Role::User));
        assert!(Role::Admin.grants(Role::Admin));
        assert!(Role::User.grants(Role::User));
        assert!(!Role::User.grants(Role::Admin));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            phone: "9999999999".to_string(),
            email: "test@example.com".to_string(),
            role: Role::User,
            wallet: 0.0,
            deleted: false,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("password"));
    }
}
