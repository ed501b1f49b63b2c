use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::json;
use uuid::Uuid;

use engine::{
    CategoryAggregate, Category, DbStore, Engine, EngineError, Expense, ExpenseInput, ExpenseStore,
    Filter, MoneyCents, NewExpense, ResultEngine, RetryPolicy, Selection, ValidationIssue,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().unwrap();
    (engine, db)
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn input(value: serde_json::Value) -> ExpenseInput {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn create_then_list_sorted_by_date_desc() {
    let (engine, _db) = engine_with_db().await;

    let food = engine
        .create_expense(
            &input(json!({"amount": 50, "category": "Food", "date": "2024-01-05"})),
            at(20, 9),
        )
        .await
        .unwrap();
    let transport = engine
        .create_expense(
            &input(json!({"amount": "30.25", "category": "Transport", "date": "2024-01-10"})),
            at(20, 10),
        )
        .await
        .unwrap();
    let bills = engine
        .create_expense(
            &input(json!({"amount": 100, "category": "Bills", "date": "2024-01-05"})),
            at(20, 11),
        )
        .await
        .unwrap();

    assert_eq!(transport.amount, MoneyCents::new(3025));
    assert_eq!(food.created_at, food.updated_at);

    let ids: Vec<Uuid> = engine
        .list_expenses()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![transport.id, bills.id, food.id]);
}

#[tokio::test]
async fn create_defaults_date_to_submission_day() {
    let (engine, _db) = engine_with_db().await;
    let expense = engine
        .create_expense(&input(json!({"amount": 12, "category": "Other"})), at(9, 23))
        .await
        .unwrap();
    assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
}

#[tokio::test]
async fn invalid_submission_is_not_stored() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_expense(&input(json!({"amount": "abc", "category": "Bogus"})), at(1, 0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(vec![
            ValidationIssue::AmountNotNumeric,
            ValidationIssue::CategoryNotAllowed,
        ])
    );
    assert!(engine.list_expenses().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_once() {
    let (engine, _db) = engine_with_db().await;
    let expense = engine
        .create_expense(&input(json!({"amount": 5, "category": "Food"})), at(2, 8))
        .await
        .unwrap();

    engine.delete_expense(&expense.id.to_string()).await.unwrap();
    assert!(engine.list_expenses().await.unwrap().is_empty());

    let again = engine.delete_expense(&expense.id.to_string()).await;
    assert!(matches!(again, Err(EngineError::KeyNotFound(_))));

    let malformed = engine.delete_expense("not-an-id").await;
    assert!(matches!(malformed, Err(EngineError::KeyNotFound(_))));
}

#[tokio::test]
async fn stats_groups_by_category_and_lists_latest() {
    let (engine, _db) = engine_with_db().await;
    for (i, (amount, category)) in [
        (50, "Food"),
        (30, "Transport"),
        (20, "Food"),
        (100, "Bills"),
        (1, "Other"),
        (2, "Other"),
    ]
    .into_iter()
    .enumerate()
    {
        engine
            .create_expense(
                &input(json!({"amount": amount, "category": category})),
                at(3, i as u32),
            )
            .await
            .unwrap();
    }

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total, 6);
    assert_eq!(
        stats.by_category,
        vec![
            CategoryAggregate {
                category: "Bills".to_string(),
                count: 1,
                total_minor: 10_000,
            },
            CategoryAggregate {
                category: "Food".to_string(),
                count: 2,
                total_minor: 7_000,
            },
            CategoryAggregate {
                category: "Other".to_string(),
                count: 2,
                total_minor: 300,
            },
            CategoryAggregate {
                category: "Transport".to_string(),
                count: 1,
                total_minor: 3_000,
            },
        ]
    );
    assert_eq!(stats.latest.len(), 5);
    assert_eq!(stats.latest[0].amount, MoneyCents::new(200));
    assert!(
        stats
            .latest
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
}

#[tokio::test]
async fn summary_over_stored_records() {
    let (engine, _db) = engine_with_db().await;
    for (amount, category, date) in [
        (50, "Food", "2024-01-05"),
        (30, "Transport", "2024-01-10"),
        (99, "Food", "2023-12-31"),
    ] {
        engine
            .create_expense(
                &input(json!({"amount": amount, "category": category, "date": date})),
                at(15, 0),
            )
            .await
            .unwrap();
    }

    let filter = Filter {
        month: Selection::Only(0),
        year: Selection::Only(2024),
        ..Filter::all()
    };
    let summary = engine.summary(&filter).await.unwrap();
    assert_eq!(summary.total, MoneyCents::new(8000));
    assert_eq!(summary.totals.len(), 2);
    assert_eq!(summary.totals.get(Category::Food), Some(MoneyCents::new(5000)));
    assert_eq!(
        summary.series.first().map(|p| p.date),
        NaiveDate::from_ymd_opt(2024, 1, 5)
    );
}

async fn insert_raw(db: &DatabaseConnection, id: &str, amount_minor: i64, category: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO expenses (id, amount_minor, category, occurred_on, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            amount_minor.into(),
            category.into(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().into(),
            at(1, 0).into(),
            at(1, 0).into(),
        ],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn corrupted_rows_fail_loudly() {
    let (engine, db) = engine_with_db().await;
    insert_raw(&db, &Uuid::new_v4().to_string(), 0, "Food").await;

    let err = engine.list_expenses().await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn unknown_stored_category_is_corruption() {
    let (engine, db) = engine_with_db().await;
    insert_raw(&db, &Uuid::new_v4().to_string(), 100, "Test").await;

    let err = engine.list_expenses().await.unwrap_err();
    assert!(matches!(err, EngineError::Corrupted(_)));
    let err = engine.stats().await.unwrap_err();
    assert!(matches!(err, EngineError::Corrupted(_)));
}

#[tokio::test]
async fn malformed_stored_id_is_corruption() {
    let (engine, db) = engine_with_db().await;
    insert_raw(&db, "not-a-uuid", 100, "Food").await;

    let err = engine.list_expenses().await.unwrap_err();
    assert!(matches!(err, EngineError::Corrupted(_)));
}

#[tokio::test]
async fn storing_the_same_record_twice_keeps_one_row() {
    let (_, db) = engine_with_db().await;
    let store = DbStore::new(db);
    let expense = Expense::new(
        NewExpense {
            amount: MoneyCents::new(4200),
            category: Category::Bills,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        },
        at(2, 0),
    );

    store.create(&expense).await.unwrap();
    store.create(&expense).await.unwrap();
    assert_eq!(store.list_all().await.unwrap(), vec![expense]);
}

#[tokio::test]
async fn ping_reports_connection_state() {
    let (engine, db) = engine_with_db().await;
    assert!(engine.is_store_connected().await);

    db.close().await.unwrap();
    assert!(!engine.is_store_connected().await);
}

/// Store that is unreachable for the first `failures` calls.
struct FlakyStore {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyStore {
    fn check(&self) -> ResultEngine<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(EngineError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for FlakyStore {
    async fn create(&self, _expense: &Expense) -> ResultEngine<()> {
        self.check()
    }

    async fn list_all(&self) -> ResultEngine<Vec<Expense>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<()> {
        self.check()?;
        Err(EngineError::KeyNotFound(id.to_string()))
    }

    async fn aggregate_by_category(&self) -> ResultEngine<Vec<CategoryAggregate>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn count(&self) -> ResultEngine<u64> {
        self.check()?;
        Ok(0)
    }

    async fn latest(&self, _limit: u64) -> ResultEngine<Vec<Expense>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn ping(&self) -> ResultEngine<()> {
        self.check()
    }
}

fn flaky_engine(failures: u32) -> (Engine, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore {
        failures,
        calls: AtomicU32::new(0),
    });
    let engine = Engine::builder()
        .store(store.clone())
        .retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(200),
        })
        .build()
        .unwrap();
    (engine, store)
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let (engine, store) = flaky_engine(2);
    let expense = engine
        .create_expense(&input(json!({"amount": 1, "category": "Food"})), at(1, 0))
        .await
        .unwrap();
    assert_eq!(expense.category, Category::Food);
    assert_eq!(store.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn persistent_outage_surfaces_store_unavailable() {
    let (engine, store) = flaky_engine(u32::MAX);
    let err = engine.list_expenses().await.unwrap_err();
    assert!(matches!(err, EngineError::StoreUnavailable(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn builder_requires_a_store() {
    assert!(Engine::builder().build().is_err());
}

/// Database store whose first create commits but reports a dropped
/// connection, as if the acknowledgement was lost.
struct LostAckStore {
    inner: DbStore,
    dropped: AtomicBool,
}

#[async_trait]
impl ExpenseStore for LostAckStore {
    async fn create(&self, expense: &Expense) -> ResultEngine<()> {
        self.inner.create(expense).await?;
        if !self.dropped.swap(true, Ordering::SeqCst) {
            return Err(EngineError::StoreUnavailable("connection reset".to_string()));
        }
        Ok(())
    }

    async fn list_all(&self) -> ResultEngine<Vec<Expense>> {
        self.inner.list_all().await
    }

    async fn delete_by_id(&self, id: Uuid) -> ResultEngine<()> {
        self.inner.delete_by_id(id).await
    }

    async fn aggregate_by_category(&self) -> ResultEngine<Vec<CategoryAggregate>> {
        self.inner.aggregate_by_category().await
    }

    async fn count(&self) -> ResultEngine<u64> {
        self.inner.count().await
    }

    async fn latest(&self, limit: u64) -> ResultEngine<Vec<Expense>> {
        self.inner.latest(limit).await
    }

    async fn ping(&self) -> ResultEngine<()> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn retried_create_after_lost_ack_stores_once() {
    let (_, db) = engine_with_db().await;
    let engine = Engine::builder()
        .store(Arc::new(LostAckStore {
            inner: DbStore::new(db),
            dropped: AtomicBool::new(false),
        }))
        .retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        })
        .build()
        .unwrap();

    let created = engine
        .create_expense(&input(json!({"amount": 7, "category": "Food"})), at(4, 0))
        .await
        .unwrap();

    let stored = engine.list_expenses().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, created.id);
    assert_eq!(engine.stats().await.unwrap().total, 1);
}
