//! Database module for rankwatch.
//!
//! Uses `rusqlite` (bundled `SQLite`) to persist tracked summoners, their
//! notification channels and processed matches.

/// Notification destination CRUD operations.
pub mod destinations;
/// Match storage.
pub mod matches;
/// Summoner CRUD operations.
pub mod summoners;

mod connection;
mod migrations;
mod repository;

#[allow(clippy::module_name_repetitions)]
pub use connection::open_db;
pub use repository::SqliteRepository;
