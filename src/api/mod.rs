//! HTTP API: router assembly, shared error type, and route handlers.

pub mod activities;
pub mod addresses;
pub mod error;
pub mod parks;
pub mod reviews;
pub mod routes;
pub mod tickets;
pub mod users;
