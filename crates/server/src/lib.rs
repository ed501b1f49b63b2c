use api_types::error::{ErrorBody, ValidationErrorBody};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{Category, EngineError, ValidationIssue};
use report::ReportError;

pub use server::{app, run_with_listener};

mod expenses;
mod health;
mod report_pdf;
mod server;
mod statistics;

pub enum ServerError {
    Engine(EngineError),
    /// A submission failed validation; `received` echoes the request body.
    Validation {
        issues: Vec<ValidationIssue>,
        received: serde_json::Value,
    },
    Report(ReportError),
    Internal(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidAmount(_) | EngineError::Corrupted(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidAmount(detail) => {
            tracing::error!("corrupted amount reached the engine: {detail}");
            "internal server error".to_string()
        }
        EngineError::Corrupted(detail) => {
            tracing::error!("{detail}");
            "internal server error".to_string()
        }
        EngineError::StoreUnavailable(detail) => {
            tracing::error!("store unavailable: {detail}");
            "store unavailable".to_string()
        }
        EngineError::KeyNotFound(_) => "Expense not found".to_string(),
        other => other.to_string(),
    }
}

fn validation_body(
    issues: Vec<ValidationIssue>,
    received: serde_json::Value,
) -> ValidationErrorBody {
    let required: Vec<String> = issues
        .iter()
        .filter(|issue| issue.is_missing())
        .map(|issue| issue.field().to_string())
        .collect();
    let category_rejected = issues.contains(&ValidationIssue::CategoryNotAllowed);

    let message = if !required.is_empty() {
        "Missing required fields"
    } else {
        match issues.first().map(ValidationIssue::field) {
            Some("amount") => "Amount must be a number",
            Some("category") => "Invalid category",
            _ => "Invalid date",
        }
    };

    ValidationErrorBody {
        message: message.to_string(),
        errors: issues.iter().map(ToString::to_string).collect(),
        received,
        required: (!required.is_empty()).then_some(vec![
            "amount".to_string(),
            "category".to_string(),
        ]),
        allowed: category_rejected.then(|| {
            Category::names()
                .into_iter()
                .map(str::to_string)
                .collect()
        }),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Validation { issues, received } => {
                return (StatusCode::BAD_REQUEST, Json(validation_body(issues, received)))
                    .into_response();
            }
            ServerError::Engine(EngineError::Validation(issues)) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(validation_body(issues, serde_json::Value::Null)),
                )
                    .into_response();
            }
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Report(err) => {
                tracing::error!("report rendering failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Internal(err) => {
                tracing::error!("{err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody::new(error))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<ReportError> for ServerError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use serde_json::json;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_unavailable_maps_to_503() {
        let res =
            ServerError::from(EngineError::StoreUnavailable("down".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let err = EngineError::Database(DbErr::Custom("secret table".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_for_engine_error(err), "internal server error");

        let err = EngineError::InvalidAmount("expense 1 has amount 0.00".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_for_engine_error(err), "internal server error");

        let err = EngineError::Corrupted("stored expense has unknown category \"Test\"".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn bad_filter_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidFilter("month 13".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_body_reports_required_and_allowed() {
        let body = validation_body(
            vec![
                ValidationIssue::AmountMissing,
                ValidationIssue::CategoryNotAllowed,
            ],
            json!({"category": "Bogus"}),
        );
        assert_eq!(body.message, "Missing required fields");
        assert_eq!(body.errors.len(), 2);
        assert_eq!(
            body.required,
            Some(vec!["amount".to_string(), "category".to_string()])
        );
        assert_eq!(
            body.allowed.as_deref().map(<[String]>::len),
            Some(Category::ALL.len())
        );
        assert_eq!(body.received, json!({"category": "Bogus"}));
    }

    #[test]
    fn validation_body_omits_optional_fields() {
        let body = validation_body(vec![ValidationIssue::AmountNotNumeric], json!({}));
        assert_eq!(body.message, "Amount must be a number");
        assert!(body.required.is_none());
        assert!(body.allowed.is_none());
    }
}
