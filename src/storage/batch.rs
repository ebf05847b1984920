// storage/batch.rs
// Batched conditional writes with bounded retry of unprocessed items

use std::time::Duration;

use log::{debug, warn};
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::RetryPolicy;
use crate::error_handling::StorageError;
use crate::storage::store::{item_key, Store};
use crate::storage::types::{request_count, BatchWriteOutput, RequestsByTable, WriteRequest};

/// Creates the delay sequence used between resubmissions of unprocessed items.
///
/// `ExponentialBackoff` yields `base^n * factor`; with base 2 and factor half
/// the initial delay the sequence starts at `initial_delay` and doubles.
pub fn retry_delays(policy: &RetryPolicy) -> impl Iterator<Item = Duration> {
    let half_ms = (policy.initial_delay.as_millis() as u64 / 2).max(1);
    ExponentialBackoff::from_millis(2)
        .factor(half_ms)
        .max_delay(policy.max_delay)
        .take(policy.max_attempts)
}

impl Store {
    /// Submits one batch of write requests in a single transaction.
    ///
    /// At most `max_batch_items` requests are processed; the rest come back
    /// in `unprocessed`. If SQLite reports the database busy or locked the
    /// transaction is rolled back and every request comes back unprocessed.
    ///
    /// # Errors
    ///
    /// `StorageError::DuplicateKey` if any put hits an existing key. The
    /// whole call is rolled back in that case.
    pub async fn batch_write(
        &self,
        requests: RequestsByTable,
    ) -> Result<BatchWriteOutput, StorageError> {
        let (current, overflow) = split_batch(requests, self.options.max_batch_items);

        match self.write_transaction(&current).await {
            Ok(()) => Ok(BatchWriteOutput {
                unprocessed: overflow,
            }),
            Err(e) if e.is_contention() => {
                debug!("batch write hit contention, returning batch as unprocessed: {e}");
                let mut unprocessed = current;
                for (table, mut rest) in overflow {
                    unprocessed.entry(table).or_default().append(&mut rest);
                }
                Ok(BatchWriteOutput { unprocessed })
            }
            Err(e) => Err(e),
        }
    }

    /// Submits write requests until none remain unprocessed.
    ///
    /// Unprocessed requests are resubmitted after exponentially growing
    /// delays (see [`retry_delays`]).
    ///
    /// # Errors
    ///
    /// `StorageError::UnprocessedItems` once the retry budget is spent, plus
    /// any error [`Store::batch_write`] returns. Requests committed by earlier
    /// calls stay committed.
    pub async fn batch_write_all(&self, requests: RequestsByTable) -> Result<(), StorageError> {
        let mut pending = self.batch_write(requests).await?.unprocessed;
        let mut attempts = 1;
        let mut delays = retry_delays(&self.options.retry);

        while request_count(&pending) > 0 {
            let Some(delay) = delays.next() else {
                return Err(StorageError::UnprocessedItems {
                    remaining: request_count(&pending),
                    attempts,
                });
            };
            warn!(
                "{} write request(s) unprocessed, retrying in {}ms",
                request_count(&pending),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            pending = self.batch_write(pending).await?.unprocessed;
            attempts += 1;
        }

        Ok(())
    }

    async fn write_transaction(&self, requests: &RequestsByTable) -> Result<(), StorageError> {
        if request_count(requests) == 0 {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (table, table_requests) in requests {
            for request in table_requests {
                match request {
                    WriteRequest::Put(item) => {
                        let key = item_key(table, item)?;
                        let result = sqlx::query(
                            "INSERT INTO items (table_name, item_key, body) VALUES (?, ?, ?)
                             ON CONFLICT(table_name, item_key) DO NOTHING",
                        )
                        .bind(table)
                        .bind(key.encode())
                        .bind(serde_json::to_string(item)?)
                        .execute(&mut *tx)
                        .await?;

                        if result.rows_affected() == 0 {
                            // Dropping the transaction rolls back the whole batch
                            return Err(StorageError::DuplicateKey {
                                table: table.clone(),
                                key: key.encode(),
                            });
                        }
                    }
                    WriteRequest::Delete(key) => {
                        sqlx::query("DELETE FROM items WHERE table_name = ? AND item_key = ?")
                            .bind(table)
                            .bind(key.encode())
                            .execute(&mut *tx)
                            .await?;
                    }
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Splits requests into the first `limit` (in table order) and the remainder.
fn split_batch(requests: RequestsByTable, limit: usize) -> (RequestsByTable, RequestsByTable) {
    let mut current = RequestsByTable::new();
    let mut overflow = RequestsByTable::new();
    let mut budget = limit;

    for (table, mut table_requests) in requests {
        if table_requests.is_empty() {
            continue;
        }
        let take = budget.min(table_requests.len());
        let rest = table_requests.split_off(take);
        budget -= take;
        if !table_requests.is_empty() {
            current.insert(table.clone(), table_requests);
        }
        if !rest.is_empty() {
            overflow.insert(table, rest);
        }
    }

    (current, overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreOptions;
    use crate::storage::test_helpers::{create_test_store_with, item, puts};
    use crate::storage::types::{Key, ScanParams};
    use serde_json::json;

    fn fast_options(max_batch_items: usize, max_attempts: usize) -> StoreOptions {
        StoreOptions {
            max_batch_items,
            retry: RetryPolicy {
                initial_delay: Duration::from_millis(2),
                max_delay: Duration::from_millis(10),
                max_attempts,
            },
        }
    }

    #[test]
    fn test_retry_delays_double_from_initial() {
        let delays: Vec<Duration> = retry_delays(&RetryPolicy::default()).take(3).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800)
            ]
        );
    }

    #[test]
    fn test_retry_delays_are_capped_and_bounded() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(500),
            max_attempts: 4,
        };
        let delays: Vec<Duration> = retry_delays(&policy).collect();
        assert_eq!(delays.len(), 4);
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(500)));
    }

    #[test]
    fn test_split_batch_respects_limit_across_tables() {
        let mut requests = RequestsByTable::new();
        requests.insert("a".into(), puts(1..=3));
        requests.insert("b".into(), puts(1..=4));

        let (current, overflow) = split_batch(requests, 5);
        assert_eq!(request_count(&current), 5);
        assert_eq!(current["a"].len(), 3);
        assert_eq!(current["b"].len(), 2);
        assert_eq!(request_count(&overflow), 2);
        assert!(!overflow.contains_key("a"));
    }

    #[tokio::test]
    async fn test_batch_write_returns_overflow_unprocessed() {
        let store = create_test_store_with(fast_options(4, 3)).await;
        let mut requests = RequestsByTable::new();
        requests.insert("customers".into(), puts(1..=6));

        let output = store.batch_write(requests).await.unwrap();
        assert_eq!(request_count(&output.unprocessed), 2);

        let stored = store.scan_all(ScanParams::new("customers")).await.unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn test_batch_write_all_resubmits_until_done() {
        let store = create_test_store_with(fast_options(4, 5)).await;
        let mut requests = RequestsByTable::new();
        requests.insert("customers".into(), puts(1..=10));

        store.batch_write_all(requests).await.expect("all written");
        let stored = store.scan_all(ScanParams::new("customers")).await.unwrap();
        assert_eq!(stored.len(), 10);
    }

    #[tokio::test]
    async fn test_batch_write_all_fails_when_retries_exhausted() {
        let store = create_test_store_with(fast_options(2, 1)).await;
        let mut requests = RequestsByTable::new();
        requests.insert("customers".into(), puts(1..=7));

        let err = store.batch_write_all(requests).await.unwrap_err();
        match err {
            StorageError::UnprocessedItems {
                remaining,
                attempts,
            } => {
                assert_eq!(remaining, 3);
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Committed batches stay committed
        let stored = store.scan_all(ScanParams::new("customers")).await.unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn test_batch_write_duplicate_rolls_back_batch() {
        let store = create_test_store_with(fast_options(25, 1)).await;
        store
            .put("customers", &item(json!({"id": 3, "name": "existing"})))
            .await
            .unwrap();

        let mut requests = RequestsByTable::new();
        requests.insert("customers".into(), puts(1..=5));
        let err = store.batch_write_all(requests).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey { ref key, .. } if key == "3"));

        // Nothing from the failed batch was committed
        assert!(store.get("customers", &Key::from(1)).await.unwrap().is_none());
        let existing = store.get("customers", &Key::from(3)).await.unwrap().unwrap();
        assert_eq!(existing["name"], json!("existing"));
    }

    #[tokio::test]
    async fn test_batch_write_deletes() {
        let store = create_test_store_with(fast_options(25, 1)).await;
        store.put("carriers", &item(json!({"id": 1}))).await.unwrap();

        let mut requests = RequestsByTable::new();
        requests.insert(
            "carriers".into(),
            vec![
                WriteRequest::Delete(Key::from(1)),
                WriteRequest::Put(item(json!({"id": 2}))),
            ],
        );
        store.batch_write_all(requests).await.unwrap();
        assert!(store.get("carriers", &Key::from(1)).await.unwrap().is_none());
        assert!(store.get("carriers", &Key::from(2)).await.unwrap().is_some());
    }
}
