//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{Role, User};
use anyhow::{bail, Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{info, warn};
use uuid::Uuid;

/// Fields accepted when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub email: String,
}

/// Profile fields accepted on update. A `None` password keeps the
/// current hash.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password: Option<String>,
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                phone TEXT NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                wallet REAL NOT NULL DEFAULT 0,
                deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Create default admin user for initial setup
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'ADMIN'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let password_hash =
                hash("admin123", DEFAULT_COST).context("Failed to hash password")?;

            conn.execute(
                "INSERT INTO users (id, full_name, username, password_hash, phone, email, role, wallet, deleted, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    Uuid::new_v4().to_string(),
                    "Administrator",
                    "admin",
                    password_hash,
                    "0000000000",
                    "admin@parkpass.local",
                    Role::Admin.as_str(),
                    0.0,
                    false,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to insert admin user")?;

            info!("🔐 Default admin user created (username: admin, password: admin123)");
            warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let id_str: String = row.get(0)?;
        let role_str: String = row.get(6)?;
        Ok(User {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
            full_name: row.get(1)?,
            username: row.get(2)?,
            password_hash: row.get(3)?,
            phone: row.get(4)?,
            email: row.get(5)?,
            role: Role::from_str(&role_str).unwrap_or(Role::User),
            wallet: row.get(7)?,
            deleted: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    const USER_COLUMNS: &'static str =
        "id, full_name, username, password_hash, phone, email, role, wallet, deleted, created_at";

    /// Get user by username (soft-deleted rows included; callers decide)
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            Self::USER_COLUMNS
        ))?;

        match stmt.query_row(params![username], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by ID
    pub fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE id = ?1",
            Self::USER_COLUMNS
        ))?;

        match stmt.query_row(params![user_id.to_string()], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify username and password. Soft-deleted accounts never verify.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        match self.get_user_by_username(username)? {
            Some(user) if user.is_enabled() => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            _ => Ok(false),
        }
    }

    /// Create a new user account
    pub fn create_user(&self, new_user: &NewUser, role: Role) -> Result<User> {
        if self.get_user_by_username(&new_user.username)?.is_some() {
            bail!("Username already exists: {}", new_user.username);
        }

        let password_hash =
            hash(&new_user.password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name.clone(),
            username: new_user.username.clone(),
            password_hash,
            phone: new_user.phone.clone(),
            email: new_user.email.clone(),
            role,
            wallet: 0.0,
            deleted: false,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, full_name, username, password_hash, phone, email, role, wallet, deleted, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.id.to_string(),
                user.full_name,
                user.username,
                user.password_hash,
                user.phone,
                user.email,
                user.role.as_str(),
                user.wallet,
                user.deleted,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Created user: {} ({})", user.username, user.role.as_str());

        Ok(user)
    }

    /// List all users (admin only)
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM users", Self::USER_COLUMNS))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update profile fields; re-hashes the password when one is given.
    /// Returns false when no such user exists.
    pub fn update_user(&self, user_id: &Uuid, update: &UserUpdate) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = match &update.password {
            Some(password) => {
                let password_hash =
                    hash(password, DEFAULT_COST).context("Failed to hash password")?;
                conn.execute(
                    "UPDATE users SET full_name = ?1, phone = ?2, email = ?3, password_hash = ?4
                     WHERE id = ?5",
                    params![
                        update.full_name,
                        update.phone,
                        update.email,
                        password_hash,
                        user_id.to_string()
                    ],
                )?
            }
            None => conn.execute(
                "UPDATE users SET full_name = ?1, phone = ?2, email = ?3 WHERE id = ?4",
                params![
                    update.full_name,
                    update.phone,
                    update.email,
                    user_id.to_string()
                ],
            )?,
        };

        Ok(rows > 0)
    }

    /// Soft-delete a user. The row stays; authentication stops.
    pub fn soft_delete_user(&self, user_id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "UPDATE users SET deleted = 1 WHERE id = ?1",
            params![user_id.to_string()],
        )?;

        if rows > 0 {
            info!("🗑️  Deactivated user: {}", user_id);
        }

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn sample_user(username: &str) -> NewUser {
        NewUser {
            full_name: "Sample User".to_string(),
            username: username.to_string(),
            password: "password123".to_string(),
            phone: "9876543210".to_string(),
            email: format!("{username}@example.com"),
        }
    }

    #[test]
    fn test_default_admin_created() {
        let (store, _temp) = create_test_store();

        let admin = store.get_user_by_username("admin").unwrap();
        assert!(admin.is_some());

        let admin = admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn test_password_verification() {
        let (store, _temp) = create_test_store();

        assert!(store.verify_password("admin", "admin123").unwrap());
        assert!(!store.verify_password("admin", "wrongpassword").unwrap());
        assert!(!store.verify_password("nonexistent", "password").unwrap());
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let created = store.create_user(&sample_user("visitor1"), Role::User).unwrap();
        assert_eq!(created.username, "visitor1");
        assert_eq!(created.role, Role::User);

        let retrieved = store.get_user_by_username("visitor1").unwrap().unwrap();
        assert_eq!(retrieved.id, created.id);
        assert_eq!(retrieved.email, "visitor1@example.com");

        let by_id = store.get_user_by_id(&created.id).unwrap().unwrap();
        assert_eq!(by_id.username, "visitor1");
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _temp) = create_test_store();

        store.create_user(&sample_user("visitor1"), Role::User).unwrap();
        assert!(store.create_user(&sample_user("visitor1"), Role::User).is_err());
    }

    #[test]
    fn test_soft_delete_disables_authentication() {
        let (store, _temp) = create_test_store();

        let user = store.create_user(&sample_user("visitor1"), Role::User).unwrap();
        assert!(store.verify_password("visitor1", "password123").unwrap());

        assert!(store.soft_delete_user(&user.id).unwrap());

        // Row survives, credentials stop working.
        let row = store.get_user_by_username("visitor1").unwrap().unwrap();
        assert!(row.deleted);
        assert!(!row.is_enabled());
        assert!(!store.verify_password("visitor1", "password123").unwrap());
    }

    #[test]
    fn test_update_user_profile() {
        let (store, _temp) = create_test_store();

        let user = store.create_user(&sample_user("visitor1"), Role::User).unwrap();

        let updated = store
            .update_user(
                &user.id,
                &UserUpdate {
                    full_name: "Renamed User".to_string(),
                    phone: "1112223333".to_string(),
                    email: "renamed@example.com".to_string(),
                    password: Some("newpassword1".to_string()),
                },
            )
            .unwrap();
        assert!(updated);

        let row = store.get_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(row.full_name, "Renamed User");
        assert!(store.verify_password("visitor1", "newpassword1").unwrap());
        assert!(!store.verify_password("visitor1", "password123").unwrap());

        // Missing user reports false.
        assert!(!store
            .update_user(
                &Uuid::new_v4(),
                &UserUpdate {
                    full_name: "x".to_string(),
                    phone: "x".to_string(),
                    email: "x".to_string(),
                    password: None,
                },
            )
            .unwrap());
    }

    #[test]
    fn test_list_users() {
        let (store, _temp) = create_test_store();

        store.create_user(&sample_user("visitor1"), Role::User).unwrap();
        store.create_user(&sample_user("visitor2"), Role::User).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 3); // admin + visitor1 + visitor2
    }
}
