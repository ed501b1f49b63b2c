//! Expense API endpoints

use api_types::expense::{Expense, ExpenseDeleted, ExpenseNew};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{EngineError, ExpenseInput};

use crate::{ServerError, server::ServerState};

pub(crate) fn expense_view(expense: &engine::Expense) -> Expense {
    Expense {
        id: expense.id,
        amount: expense.amount.as_major(),
        category: expense.category.to_string(),
        date: expense.date,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

/// Handle requests for every stored expense, newest date first
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Expense>>, ServerError> {
    let expenses = state.engine.list_expenses().await?;
    Ok(Json(expenses.iter().map(expense_view).collect()))
}

/// Handle expense submissions
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let ExpenseNew {
        amount,
        category,
        date,
    } = serde_json::from_value(payload.clone())
        .map_err(|_| ServerError::Generic("request body must be a JSON object".to_string()))?;
    let input = ExpenseInput {
        amount,
        category,
        date,
    };

    match state.engine.create_expense(&input, Utc::now()).await {
        Ok(expense) => Ok((StatusCode::CREATED, Json(expense_view(&expense)))),
        Err(EngineError::Validation(issues)) => {
            tracing::debug!("rejected expense submission: {payload}");
            Err(ServerError::Validation {
                issues,
                received: payload,
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Handle deletion of a single expense
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    state.engine.delete_expense(&id).await?;
    Ok(Json(ExpenseDeleted {
        message: "Expense deleted".to_string(),
    }))
}
