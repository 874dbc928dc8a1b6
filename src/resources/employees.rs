//! Warehouse employees and their authorization codes.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::api::{ApiClient, QueryParams};
use crate::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeCheck {
    #[serde(default)]
    is_valid: bool,
}

/// Whether `code` belongs to an active employee.
pub async fn verify_code(api: &ApiClient, code: &str) -> ApiResult<bool> {
    api.post::<_, CodeCheck>("/employees/validate-code", &json!({ "code": code }))
        .await
        .map(|check| check.is_valid)
        .map_err(|e| {
            warn!(error = %e, "employee code check failed");
            e.with_message("There was a problem verifying the employee code.")
        })
}

pub async fn list(api: &ApiClient, role: Option<&str>) -> ApiResult<Vec<Employee>> {
    let mut query = QueryParams::new();
    query.push_opt("role", role);
    api.get_with("/employees", &query).await
}
