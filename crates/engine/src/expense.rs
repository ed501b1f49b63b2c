//! Expense record primitives.
//!
//! An `Expense` is created once from a validated [`NewExpense`] and is never
//! mutated afterwards; it can only be deleted.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, MoneyCents};

/// Validated submission, ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: MoneyCents,
    pub category: Category,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub category: Category,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Assigns identity and timestamps to a validated submission.
    pub fn new(new: NewExpense, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: new.amount,
            category: new.category,
            date: new.date,
            created_at,
            updated_at: created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount_minor: i64,
    pub category: String,
    pub occurred_on: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            occurred_on: ActiveValue::Set(expense.date),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let amount = MoneyCents::new(model.amount_minor);
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "stored expense {} has amount {amount}",
                model.id
            )));
        }
        let id = Uuid::parse_str(&model.id).map_err(|_| {
            EngineError::Corrupted(format!("stored expense has malformed id {:?}", model.id))
        })?;
        let category = Category::try_from(model.category.as_str()).map_err(|_| {
            EngineError::Corrupted(format!(
                "stored expense {id} has unknown category {:?}",
                model.category
            ))
        })?;
        Ok(Self {
            id,
            amount,
            category,
            date: model.occurred_on,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
