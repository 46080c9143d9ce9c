//! Domain persistence for parks, activities, tickets, reviews, and
//! addresses, backed by SQLite.
//!
//! Deletions are soft: rows get a flag and read paths filter on it
//! (cancelled tickets stay listed but read as missing individually).

use crate::models::{Activity, Address, NewActivity, NewAddress, NewPark, Park, Review, Ticket};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS parks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    opening_hours TEXT NOT NULL,
    closing_hours TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    park_id INTEGER NOT NULL REFERENCES parks(id),
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    park_id INTEGER NOT NULL REFERENCES parks(id),
    purchase_date TEXT NOT NULL,
    cancelled INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    park_id INTEGER NOT NULL REFERENCES parks(id),
    user_id TEXT NOT NULL,
    rating INTEGER NOT NULL,
    comment TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    pincode TEXT NOT NULL,
    removed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_activities_park ON activities(park_id);
CREATE INDEX IF NOT EXISTS idx_tickets_user ON tickets(user_id);
CREATE INDEX IF NOT EXISTS idx_reviews_park ON reviews(park_id);
CREATE INDEX IF NOT EXISTS idx_addresses_user ON addresses(user_id);
"#;

/// Domain store owning a single serialized connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        let park_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM parks WHERE deleted = 0", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        info!("📊 Park database initialized at: {} ({} parks)", db_path, park_count);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ===== Parks =====

    pub fn create_park(&self, park: &NewPark) -> Result<Park> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO parks (name, location, description, opening_hours, closing_hours)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                park.name,
                park.location,
                park.description,
                park.opening_hours,
                park.closing_hours
            ],
        )
        .context("Failed to insert park")?;

        let id = conn.last_insert_rowid();
        Ok(Park {
            id,
            name: park.name.clone(),
            location: park.location.clone(),
            description: park.description.clone(),
            opening_hours: park.opening_hours.clone(),
            closing_hours: park.closing_hours.clone(),
            deleted: false,
        })
    }

    pub fn get_park(&self, park_id: i64) -> Result<Option<Park>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, location, description, opening_hours, closing_hours, deleted
             FROM parks WHERE id = ?1 AND deleted = 0",
        )?;

        match stmt.query_row(params![park_id], row_to_park) {
            Ok(park) => Ok(Some(park)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_parks(&self) -> Result<Vec<Park>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, location, description, opening_hours, closing_hours, deleted
             FROM parks WHERE deleted = 0 ORDER BY id",
        )?;

        let parks = stmt
            .query_map([], row_to_park)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parks)
    }

    pub fn update_park(&self, park_id: i64, park: &NewPark) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE parks SET name = ?1, location = ?2, description = ?3,
                    opening_hours = ?4, closing_hours = ?5
             WHERE id = ?6 AND deleted = 0",
            params![
                park.name,
                park.location,
                park.description,
                park.opening_hours,
                park.closing_hours,
                park_id
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn soft_delete_park(&self, park_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE parks SET deleted = 1 WHERE id = ?1 AND deleted = 0",
            params![park_id],
        )?;
        Ok(rows > 0)
    }

    // ===== Activities =====

    pub fn create_activity(&self, park_id: i64, activity: &NewActivity) -> Result<Activity> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO activities (park_id, name, description, price) VALUES (?1, ?2, ?3, ?4)",
            params![park_id, activity.name, activity.description, activity.price],
        )
        .context("Failed to insert activity")?;

        let id = conn.last_insert_rowid();
        Ok(Activity {
            id,
            park_id,
            name: activity.name.clone(),
            description: activity.description.clone(),
            price: activity.price,
            deleted: false,
        })
    }

    pub fn create_activities(
        &self,
        park_id: i64,
        activities: &[NewActivity],
    ) -> Result<Vec<Activity>> {
        activities
            .iter()
            .map(|a| self.create_activity(park_id, a))
            .collect()
    }

    pub fn list_activities(&self, park_id: i64) -> Result<Vec<Activity>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, park_id, name, description, price, deleted
             FROM activities WHERE park_id = ?1 AND deleted = 0 ORDER BY id",
        )?;

        let activities = stmt
            .query_map(params![park_id], row_to_activity)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    pub fn update_activity(
        &self,
        activity_id: i64,
        name: &str,
        description: &str,
        price: f64,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE activities SET name = ?1, description = ?2, price = ?3
             WHERE id = ?4 AND deleted = 0",
            params![name, description, price, activity_id],
        )?;
        Ok(rows > 0)
    }

    pub fn soft_delete_activity(&self, park_id: i64, activity_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE activities SET deleted = 1
             WHERE id = ?1 AND park_id = ?2 AND deleted = 0",
            params![activity_id, park_id],
        )?;
        Ok(rows > 0)
    }

    // ===== Tickets =====

    pub fn create_ticket(
        &self,
        user_id: &Uuid,
        park_id: i64,
        purchase_date: &str,
    ) -> Result<Ticket> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tickets (user_id, park_id, purchase_date) VALUES (?1, ?2, ?3)",
            params![user_id.to_string(), park_id, purchase_date],
        )
        .context("Failed to insert ticket")?;

        let id = conn.last_insert_rowid();
        Ok(Ticket {
            id,
            user_id: *user_id,
            park_id,
            purchase_date: purchase_date.to_string(),
            cancelled: false,
        })
    }

    pub fn get_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, park_id, purchase_date, cancelled
             FROM tickets WHERE id = ?1",
        )?;

        match stmt.query_row(params![ticket_id], row_to_ticket) {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_tickets(&self, user_id: &Uuid) -> Result<Vec<Ticket>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, park_id, purchase_date, cancelled
             FROM tickets WHERE user_id = ?1 ORDER BY id",
        )?;

        let tickets = stmt
            .query_map(params![user_id.to_string()], row_to_ticket)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets)
    }

    pub fn update_ticket(&self, ticket_id: i64, purchase_date: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE tickets SET purchase_date = ?1 WHERE id = ?2 AND cancelled = 0",
            params![purchase_date, ticket_id],
        )?;
        Ok(rows > 0)
    }

    pub fn cancel_ticket(&self, ticket_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE tickets SET cancelled = 1 WHERE id = ?1 AND cancelled = 0",
            params![ticket_id],
        )?;
        Ok(rows > 0)
    }

    // ===== Reviews =====

    pub fn create_review(
        &self,
        park_id: i64,
        user_id: &Uuid,
        rating: i64,
        comment: &str,
    ) -> Result<Review> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO reviews (park_id, user_id, rating, comment) VALUES (?1, ?2, ?3, ?4)",
            params![park_id, user_id.to_string(), rating, comment],
        )
        .context("Failed to insert review")?;

        let id = conn.last_insert_rowid();
        Ok(Review {
            id,
            park_id,
            user_id: *user_id,
            rating,
            comment: comment.to_string(),
            deleted: false,
        })
    }

    pub fn list_reviews(&self, park_id: i64) -> Result<Vec<Review>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, park_id, user_id, rating, comment, deleted
             FROM reviews WHERE park_id = ?1 AND deleted = 0 ORDER BY id",
        )?;

        let reviews = stmt
            .query_map(params![park_id], row_to_review)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    pub fn update_review(&self, review_id: i64, rating: i64, comment: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE reviews SET rating = ?1, comment = ?2 WHERE id = ?3 AND deleted = 0",
            params![rating, comment, review_id],
        )?;
        Ok(rows > 0)
    }

    pub fn soft_delete_review(&self, review_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE reviews SET deleted = 1 WHERE id = ?1 AND deleted = 0",
            params![review_id],
        )?;
        Ok(rows > 0)
    }

    // ===== Addresses =====

    pub fn create_address(&self, user_id: &Uuid, address: &NewAddress) -> Result<Address> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO addresses (user_id, city, state, pincode) VALUES (?1, ?2, ?3, ?4)",
            params![user_id.to_string(), address.city, address.state, address.pincode],
        )
        .context("Failed to insert address")?;

        let id = conn.last_insert_rowid();
        Ok(Address {
            id,
            user_id: *user_id,
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            removed: false,
        })
    }

    pub fn list_addresses(&self, user_id: &Uuid) -> Result<Vec<Address>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, city, state, pincode, removed
             FROM addresses WHERE user_id = ?1 AND removed = 0 ORDER BY id",
        )?;

        let addresses = stmt
            .query_map(params![user_id.to_string()], row_to_address)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(addresses)
    }

    /// Replace a user's address set: previous rows are flagged removed,
    /// the new set is inserted.
    pub fn replace_addresses(&self, user_id: &Uuid, addresses: &[NewAddress]) -> Result<usize> {
        {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE addresses SET removed = 1 WHERE user_id = ?1 AND removed = 0",
                params![user_id.to_string()],
            )?;
        }

        for address in addresses {
            self.create_address(user_id, address)?;
        }

        Ok(addresses.len())
    }

    pub fn remove_address(&self, user_id: &Uuid, address_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE addresses SET removed = 1
             WHERE id = ?1 AND user_id = ?2 AND removed = 0",
            params![address_id, user_id.to_string()],
        )?;
        Ok(rows > 0)
    }
}

fn row_to_park(row: &rusqlite::Row<'_>) -> rusqlite::Result<Park> {
    Ok(Park {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        opening_hours: row.get(4)?,
        closing_hours: row.get(5)?,
        deleted: row.get(6)?,
    })
}

fn row_to_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        park_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        deleted: row.get(5)?,
    })
}

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let user_id: String = row.get(1)?;
    Ok(Ticket {
        id: row.get(0)?,
        user_id: Uuid::parse_str(&user_id).unwrap_or_else(|_| Uuid::nil()),
        park_id: row.get(2)?,
        purchase_date: row.get(3)?,
        cancelled: row.get(4)?,
    })
}

fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    let user_id: String = row.get(2)?;
    Ok(Review {
        id: row.get(0)?,
        park_id: row.get(1)?,
        user_id: Uuid::parse_str(&user_id).unwrap_or_else(|_| Uuid::nil()),
        rating: row.get(3)?,
        comment: row.get(4)?,
        deleted: row.get(5)?,
    })
}

fn row_to_address(row: &rusqlite::Row<'_>) -> rusqlite::Result<Address> {
    let user_id: String = row.get(1)?;
    Ok(Address {
        id: row.get(0)?,
        user_id: Uuid::parse_str(&user_id).unwrap_or_else(|_| Uuid::nil()),
        city: row.get(2)?,
        state: row.get(3)?,
        pincode: row.get(4)?,
        removed: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (Database, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::new(temp_file.path().to_str().unwrap()).unwrap();
        (db, temp_file)
    }

    fn sample_park(name: &str) -> NewPark {
        NewPark {
            name: name.to_string(),
            location: "Bangalore".to_string(),
            description: "Theme park".to_string(),
            opening_hours: "09:00".to_string(),
            closing_hours: "21:00".to_string(),
            activities: vec![],
        }
    }

    #[test]
    fn test_park_crud_and_soft_delete() {
        let (db, _temp) = create_test_db();

        let park = db.create_park(&sample_park("Wonderla")).unwrap();
        assert_eq!(db.list_parks().unwrap().len(), 1);
        assert_eq!(db.get_park(park.id).unwrap().unwrap().name, "Wonderla");

        let mut update = sample_park("Wonderla Deluxe");
        update.location = "Hyderabad".to_string();
        assert!(db.update_park(park.id, &update).unwrap());
        assert_eq!(
            db.get_park(park.id).unwrap().unwrap().location,
            "Hyderabad"
        );

        assert!(db.soft_delete_park(park.id).unwrap());
        assert!(db.get_park(park.id).unwrap().is_none());
        assert!(db.list_parks().unwrap().is_empty());

        // Second delete is a no-op.
        assert!(!db.soft_delete_park(park.id).unwrap());
    }

    #[test]
    fn test_activities_scoped_to_park() {
        let (db, _temp) = create_test_db();

        let park = db.create_park(&sample_park("Wonderla")).unwrap();
        let other = db.create_park(&sample_park("EsselWorld")).unwrap();

        let created = db
            .create_activities(
                park.id,
                &[
                    NewActivity {
                        name: "Wave pool".to_string(),
                        description: "Big waves".to_string(),
                        price: 12.5,
                    },
                    NewActivity {
                        name: "Roller coaster".to_string(),
                        description: "Fast".to_string(),
                        price: 20.0,
                    },
                ],
            )
            .unwrap();
        assert_eq!(created.len(), 2);

        assert_eq!(db.list_activities(park.id).unwrap().len(), 2);
        assert!(db.list_activities(other.id).unwrap().is_empty());

        // Deleting through the wrong park fails the cross-check.
        assert!(!db.soft_delete_activity(other.id, created[0].id).unwrap());
        assert!(db.soft_delete_activity(park.id, created[0].id).unwrap());
        assert_eq!(db.list_activities(park.id).unwrap().len(), 1);
    }

    #[test]
    fn test_ticket_lifecycle() {
        let (db, _temp) = create_test_db();
        let park = db.create_park(&sample_park("Wonderla")).unwrap();
        let user_id = Uuid::new_v4();

        let ticket = db
            .create_ticket(&user_id, park.id, "2025-06-01T10:00:00Z")
            .unwrap();

        assert_eq!(db.list_tickets(&user_id).unwrap().len(), 1);
        assert!(db.list_tickets(&Uuid::new_v4()).unwrap().is_empty());

        assert!(db.update_ticket(ticket.id, "2025-06-02T10:00:00Z").unwrap());
        assert!(db.cancel_ticket(ticket.id).unwrap());

        // Cancelled tickets cannot be updated or cancelled again.
        assert!(!db.update_ticket(ticket.id, "2025-06-03T10:00:00Z").unwrap());
        assert!(!db.cancel_ticket(ticket.id).unwrap());

        let row = db.get_ticket(ticket.id).unwrap().unwrap();
        assert!(row.cancelled);
    }

    #[test]
    fn test_review_soft_delete_hides_from_listing() {
        let (db, _temp) = create_test_db();
        let park = db.create_park(&sample_park("Wonderla")).unwrap();
        let user_id = Uuid::new_v4();

        let review = db.create_review(park.id, &user_id, 4, "Great rides").unwrap();
        db.create_review(park.id, &user_id, 2, "Long queues").unwrap();

        assert_eq!(db.list_reviews(park.id).unwrap().len(), 2);

        assert!(db.update_review(review.id, 5, "Even better now").unwrap());
        assert!(db.soft_delete_review(review.id).unwrap());
        let remaining = db.list_reviews(park.id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].comment, "Long queues");
    }

    #[test]
    fn test_address_replace_and_remove() {
        let (db, _temp) = create_test_db();
        let user_id = Uuid::new_v4();

        db.create_address(
            &user_id,
            &NewAddress {
                city: "Mumbai".to_string(),
                state: "MH".to_string(),
                pincode: "400001".to_string(),
            },
        )
        .unwrap();

        let replaced = db
            .replace_addresses(
                &user_id,
                &[
                    NewAddress {
                        city: "Pune".to_string(),
                        state: "MH".to_string(),
                        pincode: "411001".to_string(),
                    },
                    NewAddress {
                        city: "Nagpur".to_string(),
                        state: "MH".to_string(),
                        pincode: "440001".to_string(),
                    },
                ],
            )
            .unwrap();
        assert_eq!(replaced, 2);

        let addresses = db.list_addresses(&user_id).unwrap();
        assert_eq!(addresses.len(), 2);
        assert!(addresses.iter().all(|a| a.city != "Mumbai"));

        assert!(db.remove_address(&user_id, addresses[0].id).unwrap());
        assert_eq!(db.list_addresses(&user_id).unwrap().len(), 1);

        // Wrong owner cannot remove.
        let other = Uuid::new_v4();
        assert!(!db.remove_address(&other, addresses[1].id).unwrap());
    }
}
