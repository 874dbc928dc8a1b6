//! Fuel tank availability, per-vehicle consumption records and
//! replenishments.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::api::{ApiClient, QueryParams};
use crate::error::ApiResult;
use crate::resources::{end_of_day, non_blank, start_of_day, MessageResponse};

/// Tank state. The backend serializes the gallon amounts as decimal strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FuelAvailability {
    pub id: i64,
    pub available: Value,
    pub used: Value,
    pub updated_at: String,
}

impl FuelAvailability {
    /// Gallons left in the tank, whether the backend sent a string or a number.
    pub fn available_gallons(&self) -> Option<f64> {
        match &self.available {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FuelRecord {
    pub id: i64,
    pub vehicle_id: Value,
    pub driver: String,
    pub mileage: f64,
    pub gallons: f64,
    pub record_date: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub current_tag: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FuelRecordsPage {
    pub fuel_records: Vec<FuelRecord>,
    #[serde(default)]
    pub availability: Option<FuelAvailability>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FleetVehicle {
    pub id: i64,
    #[serde(default)]
    pub current_tag: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LastRecord {
    pub id: i64,
    pub current_tag: String,
    pub driver: String,
    pub gallons: f64,
    pub mileage: f64,
    pub record_date: String,
    pub vehicle_id: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Lookup data for the consumption form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInitialData {
    #[serde(default)]
    pub vehicles: Vec<FleetVehicle>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub last_records: Vec<LastRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFuelRecord {
    pub vehicle_id: i64,
    pub driver: String,
    pub mileage: f64,
    pub gallons: f64,
    pub record_date: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replenishment {
    pub gallons: f64,
    pub user_id: i64,
    pub replenishment_date: String,
    pub user_password: String,
}

/// Consumption record filter. Dates are plain `YYYY-MM-DD` and are widened to
/// cover the whole day before being sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuelRecordFilter {
    pub current_tag: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FuelRecordFilter {
    pub fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_opt("current_tag", non_blank(self.current_tag.as_deref()))
            .push_opt(
                "start_date",
                non_blank(self.start_date.as_deref()).map(start_of_day),
            )
            .push_opt(
                "end_date",
                non_blank(self.end_date.as_deref()).map(end_of_day),
            );
        q
    }
}

pub async fn dashboard(api: &ApiClient) -> ApiResult<Value> {
    api.get("/fuel/dashboard").await
}

pub async fn availability(api: &ApiClient) -> ApiResult<Vec<FuelAvailability>> {
    api.get("/fuel/availability").await
}

/// Gallons currently available, or `None` when the tank state could not be
/// loaded. Failures are logged, never returned.
pub async fn current_availability(api: &ApiClient) -> Option<f64> {
    match availability(api).await {
        Ok(rows) => Some(
            rows.first()
                .and_then(FuelAvailability::available_gallons)
                .unwrap_or(0.0),
        ),
        Err(e) => {
            warn!(error = %e, "could not load fuel availability");
            None
        }
    }
}

pub async fn register_initial_data(api: &ApiClient) -> ApiResult<RegisterInitialData> {
    api.get("/fuel/register-data").await
}

pub async fn register_consumption(
    api: &ApiClient,
    record: &NewFuelRecord,
) -> ApiResult<MessageResponse> {
    api.post("/fuel/records", record).await
}

pub async fn filter_records(
    api: &ApiClient,
    filter: &FuelRecordFilter,
) -> ApiResult<FuelRecordsPage> {
    api.get_with("/fuel/records/filtered", &filter.to_query())
        .await
}

pub async fn register_replenishment(
    api: &ApiClient,
    replenishment: &Replenishment,
) -> ApiResult<MessageResponse> {
    api.post("/fuel/replenishments", replenishment).await
}

pub async fn recent_replenishments(api: &ApiClient) -> ApiResult<Value> {
    api.get("/fuel/replenishments").await
}

pub async fn replenishment_chart(api: &ApiClient) -> ApiResult<Value> {
    api.get("/fuel/replenishments/chart").await
}

/// Zero the tank counters. The backend re-checks `password` for `user_id`.
pub async fn reset_availability(
    api: &ApiClient,
    user_id: i64,
    password: &str,
) -> ApiResult<MessageResponse> {
    api.post(
        "/fuel/reset",
        &json!({ "user_id": user_id, "password": password }),
    )
    .await
}
