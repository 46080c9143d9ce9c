//! Authentication and authorization.
//!
//! Bearer-token authentication (issue + verify), the per-request
//! authentication gate, the route access-control table, and the
//! SQLite-backed credential store.

pub mod api;
pub mod gate;
pub mod models;
pub mod rules;
pub mod token;
pub mod user_store;

pub use gate::{authenticate, authorize};
pub use models::AuthContext;
pub use token::TokenService;
pub use user_store::UserStore;
