//! Material stock, outputs and stock adjustments.
//!
//! Mutations replace backend failures with an operator-facing message; the
//! original error stays reachable through `source()`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::api::{ApiClient, QueryParams};
use crate::error::ApiResult;

pub const DEFAULT_OUTPUT_REASON: &str = "General output";
pub const OUTPUT_MOVEMENT_TYPE: &str = "salida";
/// Attributed user when an output is registered without one.
pub const DEFAULT_OUTPUT_USER_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Material {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Value,
    pub unit: String,
    #[serde(default)]
    pub stock: Value,
    #[serde(default)]
    pub minimum_stock: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMaterial {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub unit: String,
    pub stock: f64,
    pub minimum_stock: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialUpdate {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub unit: String,
    pub price: f64,
    pub minimum_stock: f64,
}

/// Stock adjustment as listed by the backend, joined with user, employee and
/// material names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Adjustment {
    pub id: i64,
    pub material_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: Value,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub employee_code: Option<String>,
    pub user_id: i64,
    pub previous_stock: Value,
    pub new_stock: Value,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub material_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAdjustment {
    pub material_id: i64,
    pub quantity: f64,
    pub reason: String,
    pub employee_code: String,
    pub user_id: i64,
}

/// Material leaving the warehouse. Missing `reason`/`user_id` are filled in
/// by [`register_output`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialOutput {
    pub material_id: i64,
    pub quantity: f64,
    pub reason: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct OutputBody<'a> {
    material_id: i64,
    quantity: f64,
    reason: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    user_id: i64,
}

impl MaterialOutput {
    fn body(&self) -> OutputBody<'_> {
        OutputBody {
            material_id: self.material_id,
            quantity: self.quantity,
            reason: self
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_OUTPUT_REASON),
            kind: OUTPUT_MOVEMENT_TYPE,
            user_id: self
                .user_id
                .filter(|id| *id != 0)
                .unwrap_or(DEFAULT_OUTPUT_USER_ID),
        }
    }
}

pub async fn list(api: &ApiClient) -> ApiResult<Vec<Material>> {
    api.get("/materials").await
}

pub async fn adjustments(api: &ApiClient) -> ApiResult<Vec<Adjustment>> {
    api.get("/materials/adjustments").await
}

/// Stock matching a free-text query on name or category.
pub async fn filter_stock(api: &ApiClient, query: &str) -> ApiResult<Vec<Material>> {
    let params = QueryParams::new().with("query", query);
    api.get_with("/materials/filter", &params).await
}

pub async fn filter_adjustments(
    api: &ApiClient,
    material_name: &str,
    start_date: &str,
    end_date: &str,
) -> ApiResult<Vec<Adjustment>> {
    let params = QueryParams::new()
        .with("materialName", material_name)
        .with("startDate", start_date)
        .with("endDate", end_date);
    api.get_with("/materials/adjustments/filter", &params).await
}

pub async fn register_output(api: &ApiClient, output: &MaterialOutput) -> ApiResult<Value> {
    api.post("/materials/output", &output.body())
        .await
        .map_err(|e| {
            warn!(material_id = output.material_id, error = %e, "material output failed");
            e.with_message("There was a problem registering the output, please try again.")
        })
}

pub async fn create_adjustment(api: &ApiClient, adjustment: &NewAdjustment) -> ApiResult<Value> {
    api.post("/materials/adjustment", adjustment)
        .await
        .map_err(|e| {
            warn!(material_id = adjustment.material_id, error = %e, "material adjustment failed");
            e.with_message("There was a problem registering the adjustment, please try again.")
        })
}

pub async fn create(api: &ApiClient, material: &NewMaterial) -> ApiResult<Value> {
    api.post("/materials", material).await.map_err(|e| {
        warn!(name = %material.name, error = %e, "material creation failed");
        e.with_message("There was a problem registering the material, please try again.")
    })
}

pub async fn update(api: &ApiClient, id: i64, material: &MaterialUpdate) -> ApiResult<Value> {
    api.put(&format!("/materials/{id}"), material)
        .await
        .map_err(|e| {
            warn!(id, error = %e, "material update failed");
            e.with_message("There was a problem editing the material, please try again.")
        })
}
