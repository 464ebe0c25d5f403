#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connection and queries for the court map.
//!
//! Persistence is a batch upsert keyed by the stable OSM id: an
//! existing row is fully overwritten, a new id is inserted. Each batch
//! runs inside one transaction; a failing batch rolls back without
//! touching earlier batches. The `courts` table is assumed to exist —
//! schema management happens outside this codebase.

pub mod db;
pub mod queries;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
