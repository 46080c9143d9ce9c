use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An amusement park.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Park {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub description: String,
    pub opening_hours: String,
    pub closing_hours: String,
    pub deleted: bool,
}

/// Payload for creating or updating a park. Activities may be created
/// inline together with a new park.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPark {
    pub name: String,
    pub location: String,
    pub description: String,
    pub opening_hours: String,
    pub closing_hours: String,
    #[serde(default)]
    pub activities: Vec<NewActivity>,
}

/// A ride or attraction belonging to a park.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub park_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// A park entry ticket bought by a user. Cancelled tickets are kept as
/// rows with the flag set; reads treat them as gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub user_id: Uuid,
    pub park_id: i64,
    pub purchase_date: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub park_id: i64,
    pub user_id: Uuid,
    pub rating: i64,
    pub comment: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub user_id: Uuid,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub auth_database_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./parkpass.db".to_string());

        let auth_database_path =
            std::env::var("AUTH_DB_PATH").unwrap_or_else(|_| "./parkpass_auth.db".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        Ok(Self {
            bind_addr,
            database_path,
            auth_database_path,
            jwt_secret,
            token_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_park_optional_activities() {
        let park: NewPark = serde_json::from_str(
            r#"{"name":"Wonderla","location":"Bangalore","description":"Theme park",
                "opening_hours":"09:00","closing_hours":"21:00"}"#,
        )
        .unwrap();
        assert!(park.activities.is_empty());

        let park: NewPark = serde_json::from_str(
            r#"{"name":"Wonderla","location":"Bangalore","description":"Theme park",
                "opening_hours":"09:00","closing_hours":"21:00",
                "activities":[{"name":"Wave pool","description":"Big waves","price":12.5}]}"#,
        )
        .unwrap();
        assert_eq!(park.activities.len(), 1);
    }
}
