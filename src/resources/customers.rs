//! Customer records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiClient, QueryParams};
use crate::error::ApiResult;
use crate::resources::{ApiResponse, ListResponse, MessageResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CustomerStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "activo",
            CustomerStatus::Inactive => "inactivo",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub contact_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_business: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rnc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial update; only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_business: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rnc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub status: Option<CustomerStatus>,
    pub is_business: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CustomerFilter {
    pub fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_opt("search", self.search.as_deref())
            .push_opt("status", self.status.map(|s| s.as_str()))
            .push_opt("is_business", self.is_business)
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset);
        q
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomerWithEquipment {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(default)]
    pub current_equipment: Vec<Value>,
    #[serde(default)]
    pub equipment_history: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CustomerStats {
    pub total_clientes: i64,
    pub clientes_empresa: i64,
    pub clientes_individuales: i64,
    pub clientes_activos: i64,
    pub clientes_inactivos: i64,
}

pub async fn list(api: &ApiClient, filter: &CustomerFilter) -> ApiResult<ListResponse<Customer>> {
    api.get_with("/customers", &filter.to_query()).await
}

pub async fn get(api: &ApiClient, id: i64) -> ApiResult<ApiResponse<Customer>> {
    api.get(&format!("/customers/{id}")).await
}

pub async fn get_with_equipment(
    api: &ApiClient,
    id: i64,
) -> ApiResult<ApiResponse<CustomerWithEquipment>> {
    api.get(&format!("/customers/{id}/equipment")).await
}

pub async fn create(api: &ApiClient, customer: &Customer) -> ApiResult<ApiResponse<Customer>> {
    api.post("/customers", customer).await
}

pub async fn update(
    api: &ApiClient,
    id: i64,
    changes: &CustomerUpdate,
) -> ApiResult<ApiResponse<Customer>> {
    api.put(&format!("/customers/{id}"), changes).await
}

pub async fn update_status(
    api: &ApiClient,
    id: i64,
    status: CustomerStatus,
) -> ApiResult<ApiResponse<Customer>> {
    api.patch(&format!("/customers/{id}/status"), &json!({ "status": status }))
        .await
}

pub async fn delete(api: &ApiClient, id: i64) -> ApiResult<MessageResponse> {
    api.delete(&format!("/customers/{id}")).await
}

/// Search by free-text term. The backend default limit is 10.
pub async fn search(api: &ApiClient, term: &str, limit: u32) -> ApiResult<ListResponse<Customer>> {
    let query = QueryParams::new().with("term", term).with("limit", limit);
    api.get_with("/customers/search", &query).await
}

pub async fn stats(api: &ApiClient) -> ApiResult<ApiResponse<CustomerStats>> {
    api.get("/customers/stats").await
}
