use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

pub use aggregation::{
    CategoryTotals, SeriesPoint, Summary, category_totals, filter_expenses, summarize, time_series,
};
pub use category::{Category, color_for};
pub use error::EngineError;
pub use expense::{Expense, NewExpense};
pub use filter::{Filter, Selection};
pub use money::MoneyCents;
pub use retry::RetryPolicy;
pub use store::{CategoryAggregate, DbStore, ExpenseStore};
pub use validation::{ExpenseInput, ValidationIssue, validate};

mod aggregation;
mod category;
mod error;
pub mod expense;
mod filter;
mod money;
mod retry;
mod store;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;

/// How many records the stats view lists as "latest".
pub const LATEST_LIMIT: u64 = 5;

/// Figures behind the stats endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub by_category: Vec<CategoryAggregate>,
    pub latest: Vec<Expense>,
}

/// Entry point for every expense operation.
///
/// Store calls go through the configured [`RetryPolicy`]; everything above
/// the store is pure.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn ExpenseStore>,
    retry: RetryPolicy,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Validates and stores a submission. A missing date defaults to the
    /// calendar day of `submitted_at`.
    pub async fn create_expense(
        &self,
        input: &ExpenseInput,
        submitted_at: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        let new = input
            .to_new_expense(submitted_at)
            .map_err(EngineError::Validation)?;
        let expense = Expense::new(new, submitted_at);
        self.retry
            .run("create expense", || self.store.create(&expense))
            .await?;
        tracing::info!(
            "created expense {} ({} {})",
            expense.id,
            expense.category,
            expense.amount
        );
        Ok(expense)
    }

    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        self.retry
            .run("list expenses", || self.store.list_all())
            .await
    }

    /// Deletes by textual id. Malformed ids are reported as not found.
    pub async fn delete_expense(&self, id: &str) -> ResultEngine<()> {
        let id = Uuid::parse_str(id)
            .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?;
        self.retry
            .run("delete expense", || self.store.delete_by_id(id))
            .await?;
        tracing::info!("deleted expense {id}");
        Ok(())
    }

    pub async fn stats(&self) -> ResultEngine<Stats> {
        let total = self.retry.run("count expenses", || self.store.count()).await?;
        let by_category = self
            .retry
            .run("aggregate expenses", || self.store.aggregate_by_category())
            .await?;
        let latest = self
            .retry
            .run("latest expenses", || self.store.latest(LATEST_LIMIT))
            .await?;
        Ok(Stats {
            total,
            by_category,
            latest,
        })
    }

    /// Filtered totals, series and grand total over every stored record.
    pub async fn summary(&self, filter: &Filter) -> ResultEngine<Summary> {
        let expenses = self.list_expenses().await?;
        summarize(&expenses, filter)
    }

    /// Single ping, no retry.
    pub async fn is_store_connected(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("store ping failed: {err}");
                false
            }
        }
    }
}

#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn ExpenseStore>>,
    retry: RetryPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.store = Some(Arc::new(DbStore::new(db)));
        self
    }

    /// Use a custom store instead of a database connection.
    pub fn store(mut self, store: Arc<dyn ExpenseStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> EngineBuilder {
        self.retry = retry;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::StoreUnavailable("no store configured".to_string()))?;
        Ok(Engine {
            store,
            retry: self.retry,
        })
    }
}
