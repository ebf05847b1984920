//! Named id counters.
//!
//! Counters live in their own table. Every operation is a single SQL
//! statement, so concurrent allocations never hand out the same id.

use log::debug;
use sqlx::Row;

use crate::error_handling::StorageError;
use crate::storage::store::Store;

impl Store {
    /// Atomically increments a counter and returns the new value.
    ///
    /// A missing counter starts at 0, so the first allocation returns 1.
    ///
    /// # Errors
    ///
    /// `StorageError::Allocation` if the stored value is not an integer.
    pub async fn allocate_id(&self, counter: &str) -> Result<i64, StorageError> {
        let row = sqlx::query(
            "INSERT INTO counters (name, value) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1
             RETURNING value",
        )
        .bind(counter)
        .fetch_one(&self.pool)
        .await?;

        row.try_get::<i64, _>("value")
            .map_err(|e| StorageError::Allocation {
                counter: counter.to_string(),
                reason: e.to_string(),
            })
    }

    /// Raises a counter to at least `value` and returns the stored value.
    ///
    /// A counter never moves down: if it is already above `value` it is
    /// left as is.
    pub async fn set_counter(&self, counter: &str, value: i64) -> Result<i64, StorageError> {
        let row = sqlx::query(
            "INSERT INTO counters (name, value) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET value = MAX(value, excluded.value)
             RETURNING value",
        )
        .bind(counter)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        let stored: i64 = row.try_get("value")?;
        if stored != value {
            debug!("counter {counter} already at {stored}, not lowered to {value}");
        }
        Ok(stored)
    }

    /// Current value of a counter, if it exists.
    pub async fn counter_value(&self, counter: &str) -> Result<Option<i64>, StorageError> {
        let value = sqlx::query_scalar("SELECT value FROM counters WHERE name = ?")
            .bind(counter)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }
}
