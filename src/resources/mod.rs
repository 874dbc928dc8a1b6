//! One module per backend resource.
//!
//! Each function maps to exactly one endpoint and goes through
//! [`ApiClient`](crate::api::ApiClient). The only shaping done here is on
//! query parameters (dropping empty filters, widening date-only bounds) and
//! on a few operation-specific error messages.

pub mod auth;
pub mod customers;
pub mod employees;
pub mod fuel;
pub mod inventory;
pub mod labels;
pub mod materials;
pub mod orders;
pub mod trips;
pub mod users;
pub mod vehicles;

use serde::{Deserialize, Serialize};

/// `{ success, data }` envelope used by the customers and orders endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// `{ success, data: [...], pagination }` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// `{ success, message }` acknowledgement returned by most mutations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Append `" 00:00:00"` to a date-only lower bound.
pub(crate) fn start_of_day(date: &str) -> String {
    format!("{} 00:00:00", date.trim())
}

/// Append `" 23:59:59"` to a date-only upper bound.
pub(crate) fn end_of_day(date: &str) -> String {
    format!("{} 23:59:59", date.trim())
}

/// `Some(trimmed)` when `value` has any non-blank content.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_are_inclusive() {
        assert_eq!(start_of_day("2024-01-01"), "2024-01-01 00:00:00");
        assert_eq!(end_of_day(" 2024-01-31 "), "2024-01-31 23:59:59");
    }

    #[test]
    fn list_response_tolerates_missing_pagination() {
        let parsed: ListResponse<i32> =
            serde_json::from_value(serde_json::json!({ "success": true, "data": [1, 2] }))
                .unwrap();
        assert_eq!(parsed.data, vec![1, 2]);
        assert_eq!(parsed.pagination, Pagination::default());
    }
}
