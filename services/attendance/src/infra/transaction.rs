use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use sea_orm::{DatabaseTransaction, IsolationLevel, TransactionTrait};
use tokio::time::timeout;
use tracing::{info, warn};

use super::client::{AttendanceDb, Tables};
use crate::config::StoreConfig;
use crate::error::{DbResultExt, StoreError, TransactionFailure};

/// Limits applied to an interactive transaction.
#[derive(Debug, Clone)]
pub struct TransactionOptions {
    pub isolation: Option<IsolationLevel>,
    /// How long to wait for the transaction to start.
    pub max_wait: Duration,
    /// How long the body may run before it is rolled back.
    pub timeout: Duration,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            isolation: None,
            max_wait: Duration::from_millis(2000),
            timeout: Duration::from_millis(5000),
        }
    }
}

impl TransactionOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            isolation: None,
            max_wait: config.tx_max_wait,
            timeout: config.tx_timeout,
        }
    }

    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Future returned by a transaction body.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 't>>;

impl AttendanceDb {
    /// Run `body` inside one transaction.
    ///
    /// Every write made through the given tables commits together when the body returns
    /// `Ok`, and none of them persist when it returns `Err` or exceeds the timeout.
    ///
    /// ```ignore
    /// db.transaction(None, |tx| Box::pin(async move {
    ///     let user = tx.users().create(new_user).await?;
    ///     tx.student_notes().create(note_by(user.id)).await
    /// }))
    /// .await?;
    /// ```
    pub async fn transaction<T, F>(
        &self,
        options: Option<TransactionOptions>,
        body: F,
    ) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'t> FnOnce(Tables<'t, DatabaseTransaction>) -> TxFuture<'t, T>,
    {
        let options = options.unwrap_or_else(|| self.tx_defaults.clone());
        let started = Instant::now();

        let tx = match timeout(
            options.max_wait,
            self.conn.begin_with_config(options.isolation, None),
        )
        .await
        {
            Ok(begun) => begun.context_db("transaction", "begin")?,
            Err(_) => {
                let waited_ms = elapsed_ms(started);
                warn!(waited_ms, "transaction could not start in time");
                return Err(TransactionFailure::MaxWaitExceeded { waited_ms }.into());
            }
        };

        let outcome = timeout(options.timeout, body(Tables::new(&tx))).await;
        match outcome {
            Ok(Ok(value)) => {
                tx.commit()
                    .await
                    .map_err(|e| TransactionFailure::Commit(e.to_string()))?;
                info!(elapsed_ms = elapsed_ms(started), "transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                rollback(tx).await;
                info!(kind = err.kind(), "transaction rolled back");
                Err(err)
            }
            Err(_) => {
                rollback(tx).await;
                let timeout_ms = u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms, "transaction timed out, rolled back");
                Err(TransactionFailure::Timeout { timeout_ms }.into())
            }
        }
    }
}

async fn rollback(tx: DatabaseTransaction) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
