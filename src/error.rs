use crate::config::WidgetId;
use thiserror::Error;

/// Why a chart fell back to an empty or placeholder result.
/// Never raised to callers of `aggregate`/`build_series`; kept for observability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FallbackReason {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Column `{column}` produced no numeric values")]
    UnparseableValue { column: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unknown widget: `{0}`")]
    UnknownWidget(WidgetId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid value `{value}` for setting `{key}`")]
    InvalidSetting { key: String, value: String },
}
