//! Currency repository.
//!
//! Currency codes are referenced by users as their reporting currency. The
//! schema enforces ON DELETE RESTRICT, so deleting a code in use surfaces
//! as a foreign-key violation and is reported as `CurrencyError::InUse`.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryOrder, Set, SqlErr,
};
use thiserror::Error;

use crate::entities::currencies;

/// Errors from currency operations.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// The currency does not exist.
    #[error("currency not found")]
    NotFound,

    /// The currency code is already registered.
    #[error("currency code already exists")]
    AlreadyExists,

    /// The currency is referenced by at least one user.
    #[error("currency is in use and cannot be deleted")]
    InUse,

    /// The code is not three uppercase ASCII letters.
    #[error("currency code must be three letters")]
    InvalidCode,

    /// Database error.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Currency repository.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    db: DatabaseConnection,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all currencies ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all(&self) -> Result<Vec<currencies::Model>, DbErr> {
        currencies::Entity::find()
            .order_by_asc(currencies::Column::Code)
            .all(&self.db)
            .await
    }

    /// Finds a currency by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<currencies::Model>, DbErr> {
        currencies::Entity::find_by_id(code.to_uppercase())
            .one(&self.db)
            .await
    }

    /// Creates a new currency with its rate against the base currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidCode` for a malformed code,
    /// `CurrencyError::AlreadyExists` on a duplicate, or a database error.
    pub async fn create(&self, code: &str, rate: Decimal) -> Result<currencies::Model, CurrencyError> {
        let code = code.to_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(CurrencyError::InvalidCode);
        }

        let now = chrono::Utc::now().into();
        let currency = currencies::ActiveModel {
            code: Set(code),
            rate: Set(rate),
            created_at: Set(now),
            updated_at: Set(now),
        };

        currency.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CurrencyError::AlreadyExists
            } else {
                CurrencyError::Db(e)
            }
        })
    }

    /// Deletes a currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::NotFound` if the code is unknown,
    /// `CurrencyError::InUse` if any user reports in it, or a database
    /// error.
    pub async fn delete(&self, code: &str) -> Result<(), CurrencyError> {
        let currency = self
            .find_by_code(code)
            .await?
            .ok_or(CurrencyError::NotFound)?;

        currency.delete(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) {
                CurrencyError::InUse
            } else {
                CurrencyError::Db(e)
            }
        })?;

        Ok(())
    }
}
