//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! The user-update orchestrator lives in
//! [`repositories::user::UserRepository::update_user`]: it sequences the
//! policy checks from `tally-core` and applies the mutation inside a single
//! transaction.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{CurrencyRepository, GroupRepository, UserRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
