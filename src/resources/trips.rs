//! Delivery trips: departure registration, settlement and reports.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::{ApiClient, QueryParams};
use crate::error::{ApiError, ApiResult};
use crate::print_agent::{PrintAgent, PrintError};
use crate::resources::non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Pending,
    Completed,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Completed => "completed",
        }
    }
}

/// Trip that left but has not been settled yet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PendingTrip {
    pub id: i64,
    pub vehicle_id: i64,
    pub vehicle_tag: String,
    pub date: String,
    pub driver: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompletedTrip {
    pub id: i64,
    pub date: String,
    pub payment_date: String,
    pub amount: f64,
    pub driver: String,
    pub user: String,
    pub payment_user: String,
    pub vehicle_tag: String,
    pub concept: String,
    pub status: String,
}

/// Row in trip listings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripRecord {
    pub id: i64,
    pub vehicle_tag: String,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub date: String,
    #[serde(default)]
    pub payment_date: Option<String>,
    pub driver: String,
    pub user: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrip {
    pub vehicle_id: i64,
    pub driver_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterTripResponse {
    pub trip: PendingTrip,
    #[serde(default)]
    pub message: Option<String>,
}

/// Settlement of a pending trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripCompletion {
    pub trip_id: i64,
    pub concept: String,
    pub amount: f64,
    pub payment_user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripQuery {
    pub vehicle_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TripQuery {
    pub fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_opt("vehicle_id", self.vehicle_id.filter(|id| *id != 0))
            .push_opt("start_date", non_blank(self.start_date.as_deref()))
            .push_opt("end_date", non_blank(self.end_date.as_deref()));
        q
    }
}

/// Result of [`register_and_print`]. The trip is registered either way;
/// `print_error` tells the caller whether the receipt came out.
#[derive(Debug)]
pub struct RegisteredTrip {
    pub trip: PendingTrip,
    pub print_error: Option<PrintError>,
}

impl RegisteredTrip {
    pub fn printed(&self) -> bool {
        self.print_error.is_none()
    }
}

/// Vehicles, drivers and concepts for the trip forms.
pub async fn defaults(api: &ApiClient) -> ApiResult<Value> {
    api.get("/trips/defaults").await
}

pub async fn register(api: &ApiClient, trip: &NewTrip) -> ApiResult<RegisterTripResponse> {
    api.post("/trips", trip).await
}

/// Register a departure, then send its receipt to the print agent.
/// `document` builds the receipt from the trip the backend returned.
pub async fn register_and_print<F>(
    api: &ApiClient,
    printer: &PrintAgent,
    trip: &NewTrip,
    document: F,
) -> ApiResult<RegisteredTrip>
where
    F: FnOnce(&PendingTrip) -> Value,
{
    let registered = register(api, trip).await?;
    info!(trip_id = registered.trip.id, "trip registered");

    let print_error = match printer.print(&document(&registered.trip)).await {
        Ok(()) => None,
        Err(e) => {
            warn!(trip_id = registered.trip.id, error = %e, "trip receipt not printed");
            Some(e)
        }
    };

    Ok(RegisteredTrip {
        trip: registered.trip,
        print_error,
    })
}

pub async fn complete(api: &ApiClient, completion: &TripCompletion) -> ApiResult<Value> {
    api.patch(&format!("/trips/{}/complete", completion.trip_id), completion)
        .await
}

pub async fn list(api: &ApiClient, query: &TripQuery) -> ApiResult<Vec<TripRecord>> {
    api.get_with("/trips", &query.to_query()).await
}

pub async fn get(api: &ApiClient, trip_id: i64) -> ApiResult<CompletedTrip> {
    api.get(&format!("/trips/{trip_id}")).await
}

pub async fn get_pending(api: &ApiClient, trip_id: i64) -> ApiResult<PendingTrip> {
    api.get(&format!("/trips/pending/{trip_id}")).await
}

/// Per-vehicle, per-day trip totals.
pub async fn report(
    api: &ApiClient,
    user_id: Option<&str>,
    date: Option<&str>,
) -> ApiResult<Value> {
    let mut query = QueryParams::new();
    query
        .push_opt("user_id", non_blank(user_id))
        .push_opt("date", non_blank(date));
    api.get_with("/trips/report", &query).await
}

/// Reduce a date or date-time string to `YYYY-MM-DD`.
pub fn normalize_history_date(raw: &str) -> ApiResult<String> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc().date().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date().format("%Y-%m-%d").to_string());
        }
    }
    Err(ApiError::InvalidRequest(format!("invalid date: {raw}")))
}

pub async fn history(
    api: &ApiClient,
    date: &str,
    status: Option<TripStatus>,
) -> ApiResult<Vec<TripRecord>> {
    let mut query = QueryParams::new();
    if non_blank(Some(date)).is_some() {
        query.push("date", normalize_history_date(date)?);
    }
    query.push_opt("status", status.map(|s| s.as_str()));
    api.get_with("/trips/history", &query).await
}

pub async fn update_date(api: &ApiClient, trip_id: i64, date: &str) -> ApiResult<Value> {
    api.patch(&format!("/trips/{trip_id}"), &json!({ "date": date }))
        .await
}
