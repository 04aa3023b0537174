use std::{future::Future, time::Duration};

use sea_orm::{DatabaseConnection, DbErr};

use crate::{EngineError, ResultEngine};

mod entries;
mod report;
mod search;
mod tokens;

pub use report::{MAX_REPORT_YEAR, MIN_REPORT_YEAR, MonthlyTotals, year_query};
pub use search::{Aggregate, Page, SearchResult, SortKey};

/// Store calls running longer than this fail with [`EngineError::Timeout`].
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Entry point of the ledger: owns the store handle and runs every operation
/// against it.
///
/// Cloning is cheap, clones share the connection pool.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
    query_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Runs one store operation under the configured timeout.
    ///
    /// On timeout the future is dropped; a statement already handed to the
    /// driver may still complete.
    async fn store<T, F>(&self, op: F) -> ResultEngine<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.query_timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::error!("store call exceeded {:?}", self.query_timeout);
                Err(EngineError::Timeout(self.query_timeout))
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    query_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override [`DEFAULT_QUERY_TIMEOUT`].
    pub fn query_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.query_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            query_timeout: self
                .query_timeout
                .filter(|timeout| !timeout.is_zero())
                .unwrap_or(DEFAULT_QUERY_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_call_times_out() {
        let engine = Engine::builder()
            .query_timeout(Duration::from_millis(20))
            .build()
            .await
            .unwrap();

        let result = engine
            .store(std::future::pending::<Result<(), DbErr>>())
            .await;
        assert_eq!(result, Err(EngineError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn store_errors_are_wrapped() {
        let engine = Engine::builder().build().await.unwrap();
        let result = engine
            .store(async { Err::<(), _>(DbErr::Custom("boom".to_string())) })
            .await;
        assert!(matches!(result, Err(EngineError::Database(_))));
    }

    #[tokio::test]
    async fn zero_timeout_falls_back_to_default() {
        let engine = Engine::builder()
            .query_timeout(Duration::ZERO)
            .build()
            .await
            .unwrap();
        assert_eq!(engine.query_timeout(), DEFAULT_QUERY_TIMEOUT);
    }
}
