//! Back-office user accounts.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn list(api: &ApiClient) -> ApiResult<Vec<User>> {
    api.get("/users").await
}

/// Re-check a user's password before a sensitive action such as a fuel
/// reset.
pub async fn check_password(api: &ApiClient, user_id: i64, password: &str) -> ApiResult<Value> {
    api.post(
        &format!("/users/{user_id}/check-password"),
        &json!({ "user_id": user_id, "password": password }),
    )
    .await
}
