//! Delivery orders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{path_segment, ApiClient, QueryParams};
use crate::error::{ApiError, ApiResult};
use crate::resources::{ApiResponse, ListResponse, MessageResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum OrderStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "preparando")]
    Preparing,
    #[serde(rename = "despachado")]
    Dispatched,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendiente",
            OrderStatus::Preparing => "preparando",
            OrderStatus::Dispatched => "despachado",
            OrderStatus::Delivered => "entregado",
            OrderStatus::Cancelled => "cancelado",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderStatusHistoryEntry {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub updated_by: i64,
    #[serde(default)]
    pub updated_by_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_display_name: Option<String>,
    pub customer_phone: String,
    pub customer_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_delivery_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_driver_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_history: Option<Vec<OrderStatusHistoryEntry>>,
}

/// Fields the backend computes itself and rejects on update.
const READ_ONLY_ORDER_FIELDS: &[&str] = &[
    "id",
    "tracking_code",
    "order_date",
    "driver_name",
    "vehicle_tag",
    "customer_display_name",
    "status_history",
];

/// Status filter; `All` is the UI's "no filter" choice and is never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusFilter {
    All,
    Only(OrderStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub order_status: Option<OrderStatusFilter>,
    pub customer_id: Option<i64>,
    pub delivery_driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
    pub order_direction: Option<SortDirection>,
}

impl OrderFilter {
    pub fn to_query(&self) -> QueryParams {
        let status = match self.order_status {
            Some(OrderStatusFilter::Only(s)) => Some(s.as_str()),
            Some(OrderStatusFilter::All) | None => None,
        };
        let direction = self.order_direction.map(|d| match d {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        });

        let mut q = QueryParams::new();
        q.push_opt("search", self.search.as_deref())
            .push_opt("order_status", status)
            .push_opt("customer_id", self.customer_id)
            .push_opt("delivery_driver_id", self.delivery_driver_id)
            .push_opt("vehicle_id", self.vehicle_id)
            .push_opt("start_date", self.start_date.as_deref())
            .push_opt("end_date", self.end_date.as_deref())
            .push_opt("scheduled_date", self.scheduled_date.as_deref())
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("order_by", self.order_by.as_deref())
            .push_opt("order_direction", direction);
        q
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub size: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_driver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedOrder {
    pub id: i64,
    pub tracking_code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: CreatedOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignDeliveryRequest {
    pub delivery_driver_id: i64,
    pub vehicle_id: i64,
}

pub async fn list(api: &ApiClient, filter: &OrderFilter) -> ApiResult<ListResponse<Order>> {
    api.get_with("/orders", &filter.to_query()).await
}

/// Orders for the real-time order receiver screen.
pub async fn list_for_receiver(
    api: &ApiClient,
    filter: &OrderFilter,
) -> ApiResult<ListResponse<Order>> {
    api.get_with("/orders/receiver", &filter.to_query()).await
}

pub async fn get(api: &ApiClient, id: i64) -> ApiResult<ApiResponse<Order>> {
    api.get(&format!("/orders/{id}")).await
}

pub async fn get_by_tracking_code(api: &ApiClient, code: &str) -> ApiResult<ApiResponse<Order>> {
    let code = path_segment(code)?;
    api.get(&format!("/orders/track/{code}")).await
}

pub async fn create(api: &ApiClient, order: &CreateOrderRequest) -> ApiResult<CreateOrderResponse> {
    api.post("/orders", order).await
}

/// Body sent by [`update`]: `order` without the server-computed fields.
pub fn update_body(order: &Order) -> ApiResult<Value> {
    let mut body =
        serde_json::to_value(order).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    if let Value::Object(map) = &mut body {
        for field in READ_ONLY_ORDER_FIELDS {
            map.remove(*field);
        }
    }
    Ok(body)
}

pub async fn update(api: &ApiClient, id: i64, order: &Order) -> ApiResult<MessageResponse> {
    let body = update_body(order)?;
    api.put(&format!("/orders/{id}"), &body).await
}

pub async fn update_status(
    api: &ApiClient,
    id: i64,
    request: &UpdateOrderStatusRequest,
) -> ApiResult<MessageResponse> {
    api.patch(&format!("/orders/{id}/status"), request).await
}

/// Assign a vehicle and a driver.
pub async fn assign_delivery(
    api: &ApiClient,
    id: i64,
    request: &AssignDeliveryRequest,
) -> ApiResult<MessageResponse> {
    api.patch(&format!("/orders/{id}/assign"), request).await
}

pub async fn delete(api: &ApiClient, id: i64) -> ApiResult<MessageResponse> {
    api.delete(&format!("/orders/{id}")).await
}

/// `date` is `YYYY-MM-DD`.
pub async fn scheduled_for(api: &ApiClient, date: &str) -> ApiResult<ListResponse<Order>> {
    let date = path_segment(date)?;
    api.get(&format!("/orders/scheduled/{date}")).await
}

pub async fn search(api: &ApiClient, term: &str, limit: u32) -> ApiResult<ListResponse<Order>> {
    let query = QueryParams::new().with("term", term).with("limit", limit);
    api.get_with("/orders/search", &query).await
}

pub async fn pending_by_driver(api: &ApiClient, driver_id: i64) -> ApiResult<ListResponse<Order>> {
    api.get(&format!("/orders/driver/{driver_id}/pending")).await
}

pub async fn pending_by_customer(
    api: &ApiClient,
    customer_id: i64,
) -> ApiResult<ListResponse<Order>> {
    api.get(&format!("/orders/customer/{customer_id}/pending"))
        .await
}

/// Active products that can be ordered.
pub async fn products(api: &ApiClient) -> ApiResult<ApiResponse<Vec<Product>>> {
    api.get("/orders/products").await
}

pub async fn stats(api: &ApiClient) -> ApiResult<ApiResponse<Value>> {
    api.get("/orders/stats").await
}

pub async fn dashboard(api: &ApiClient) -> ApiResult<ApiResponse<Value>> {
    api.get("/orders/dashboard").await
}
