//! Database layer for the review roster
//!
//! SQLite persistence for teams, users, pull requests and their reviewer
//! sets, exposed to the engine as a [`roster_core::ReviewStore`].

pub mod db;
pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use db::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use store::{SqliteStore, SqliteTx};
