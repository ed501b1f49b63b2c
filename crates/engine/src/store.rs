use async_trait::async_trait;
use sea_orm::{DatabaseConnection, FromQueryResult, QueryOrder, QuerySelect, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    expense::{self, Expense},
};

/// Per-category count and sum, as computed by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct CategoryAggregate {
    pub category: String,
    pub count: i64,
    pub total_minor: i64,
}

/// Persistence seam for expense records.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Stores a record that already carries its id. Storing the same id
    /// twice is a no-op, so a retried create never duplicates a record.
    async fn create(&self, expense: &Expense) -> ResultEngine<()>;

    /// Every record, newest date first; ties newest `created_at` first.
    async fn list_all(&self) -> ResultEngine<Vec<Expense>>;

    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<()>;

    /// Count and sum per category, ordered by category name.
    async fn aggregate_by_category(&self) -> ResultEngine<Vec<CategoryAggregate>>;

    async fn count(&self) -> ResultEngine<u64>;

    /// The `limit` most recently created records.
    async fn latest(&self, limit: u64) -> ResultEngine<Vec<Expense>>;

    async fn ping(&self) -> ResultEngine<()>;
}

/// [`ExpenseStore`] backed by a sea-orm connection.
#[derive(Clone, Debug)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_expenses(models: Vec<expense::Model>) -> ResultEngine<Vec<Expense>> {
    models.into_iter().map(Expense::try_from).collect()
}

#[async_trait]
impl ExpenseStore for DbStore {
    async fn create(&self, expense: &Expense) -> ResultEngine<()> {
        let existing = expense::Entity::find_by_id(expense.id.to_string())
            .one(&self.db)
            .await?;
        if existing.is_some() {
            tracing::debug!("expense {} already stored", expense.id);
            return Ok(());
        }
        expense::ActiveModel::from(expense).insert(&self.db).await?;
        Ok(())
    }

    async fn list_all(&self) -> ResultEngine<Vec<Expense>> {
        let models = expense::Entity::find()
            .order_by_desc(expense::Column::OccurredOn)
            .order_by_desc(expense::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_expenses(models)
    }

    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<()> {
        let res = expense::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(())
    }

    async fn aggregate_by_category(&self) -> ResultEngine<Vec<CategoryAggregate>> {
        let rows = expense::Entity::find()
            .select_only()
            .column(expense::Column::Category)
            .column_as(Expr::col(expense::Column::Id).count(), "count")
            .column_as(Expr::col(expense::Column::AmountMinor).sum(), "total_minor")
            .group_by(expense::Column::Category)
            .order_by_asc(expense::Column::Category)
            .into_model::<CategoryAggregate>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn count(&self) -> ResultEngine<u64> {
        Ok(expense::Entity::find().count(&self.db).await?)
    }

    async fn latest(&self, limit: u64) -> ResultEngine<Vec<Expense>> {
        let models = expense::Entity::find()
            .order_by_desc(expense::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        into_expenses(models)
    }

    async fn ping(&self) -> ResultEngine<()> {
        Ok(self.db.ping().await?)
    }
}
