//! Fleet vehicles.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Vehicle {
    pub id: i64,
    #[serde(default)]
    pub current_tag: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonthlyConsumption {
    pub month: String,
    pub total_gallons: f64,
    pub total_kilometers: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub vehicle_id: i64,
    pub driver: String,
    pub mileage: f64,
    pub gallons: f64,
    pub record_date: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Chart data for one vehicle's fuel consumption.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleConsumption {
    #[serde(default)]
    pub monthly_data: Vec<MonthlyConsumption>,
    #[serde(default)]
    pub recent_records: Vec<ConsumptionRecord>,
}

pub async fn list(api: &ApiClient) -> ApiResult<Vec<Vehicle>> {
    api.get("/vehicles").await
}

pub async fn consumption(api: &ApiClient, vehicle_id: i64) -> ApiResult<VehicleConsumption> {
    api.get(&format!("/fuel/vehicle/{vehicle_id}/consumption"))
        .await
}

pub async fn delete(api: &ApiClient, vehicle_id: i64) -> ApiResult<Value> {
    api.delete(&format!("/vehicles/{vehicle_id}")).await
}
