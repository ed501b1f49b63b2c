use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod expense {
    use super::*;

    /// A stored expense as sent to clients. Amounts are in major units.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Expense {
        #[serde(rename = "_id")]
        pub id: Uuid,
        pub amount: f64,
        pub category: String,
        pub date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Submission body. Fields stay loosely typed so that bad values are
    /// reported as validation errors.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub category: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date: Option<serde_json::Value>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub message: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryStat {
        #[serde(rename = "_id")]
        pub category: String,
        pub count: i64,
        pub total_amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Stats {
        pub total: u64,
        pub by_category: Vec<CategoryStat>,
        pub latest: Vec<expense::Expense>,
    }
}

pub mod summary {
    use super::*;

    /// Query string of the summary and report endpoints. `"all"` or absence
    /// means no constraint; `month` is zero based.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub category: Option<String>,
        pub month: Option<String>,
        pub year: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategorySlice {
        pub category: String,
        pub amount: f64,
        /// `#rrggbb`
        pub color: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SeriesPoint {
        pub date: NaiveDate,
        pub amount: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Summary {
        pub total: f64,
        pub by_category: Vec<CategorySlice>,
        pub series: Vec<SeriesPoint>,
        pub count: usize,
    }
}

pub mod report {
    use super::*;

    /// A month or year filter value, sent either as a JSON number or as a
    /// string (`"0"`, `"2024"`, `"all"`).
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum FilterValue {
        Number(i64),
        Text(String),
    }

    impl FilterValue {
        pub fn to_query(&self) -> String {
            match self {
                Self::Number(n) => n.to_string(),
                Self::Text(text) => text.clone(),
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReportRequest {
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub month: Option<FilterValue>,
        #[serde(default)]
        pub year: Option<FilterValue>,
        /// Base64 encoded PNG or JPEG snapshot of the charts.
        #[serde(default)]
        pub chart_png_base64: Option<String>,
    }

    /// Response header carrying non-fatal report warnings.
    pub const WARNING_HEADER: &str = "x-report-warning";
}

pub mod health {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DatabaseHealth {
        pub connected: bool,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub timestamp: DateTime<Utc>,
        pub database: DatabaseHealth,
    }
}

pub mod error {
    use super::*;

    /// Body of a rejected submission.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ValidationErrorBody {
        pub message: String,
        pub errors: Vec<String>,
        pub received: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub required: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub allowed: Option<Vec<String>>,
    }

    /// Body of every other failed request. `message` mirrors `error` for
    /// clients that read either field.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        pub message: String,
    }

    impl ErrorBody {
        pub fn new(error: impl Into<String>) -> Self {
            let error = error.into();
            Self {
                message: error.clone(),
                error,
            }
        }
    }
}
