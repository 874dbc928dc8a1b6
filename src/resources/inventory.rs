//! Warehouse movements and inventory adjustments.

use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiClient, QueryParams};
use crate::error::ApiResult;
use crate::resources::materials::Adjustment;
use crate::resources::non_blank;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movement {
    pub material_id: i64,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub employee_code: String,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInventoryAdjustment {
    pub material_id: i64,
    pub quantity: f64,
    pub reason: String,
    pub employee_code: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentFilter {
    pub material_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AdjustmentFilter {
    pub fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_opt("material_name", non_blank(self.material_name.as_deref()))
            .push_opt("start_date", non_blank(self.start_date.as_deref()))
            .push_opt("end_date", non_blank(self.end_date.as_deref()));
        q
    }
}

/// Movements on `date` (`YYYY-MM-DD`), optionally for one user.
pub async fn report(api: &ApiClient, date: &str, user_id: Option<&str>) -> ApiResult<Value> {
    let mut query = QueryParams::new();
    query.push_opt("user_id", non_blank(user_id)).push("date", date);
    api.get_with("/inventory/movements", &query).await
}

pub async fn register_movement(api: &ApiClient, movement: &Movement) -> ApiResult<Value> {
    api.post("/inventory/movements", movement).await
}

pub async fn adjustments(api: &ApiClient) -> ApiResult<Vec<Adjustment>> {
    api.get("/inventory/adjustments").await
}

pub async fn filter_adjustments(
    api: &ApiClient,
    filter: &AdjustmentFilter,
) -> ApiResult<Vec<Adjustment>> {
    api.get_with("/inventory/adjustments", &filter.to_query())
        .await
}

pub async fn create_adjustment(
    api: &ApiClient,
    adjustment: &NewInventoryAdjustment,
) -> ApiResult<Value> {
    api.post("/inventory/adjustments", adjustment).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::Harness;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn report_sends_user_before_date() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/inventory/movements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "movements": [] })))
            .mount(&h.server)
            .await;

        report(&h.client, "2024-04-10", Some("3")).await.unwrap();
        report(&h.client, "2024-04-11", None).await.unwrap();

        let requests = h.requests().await;
        assert_eq!(requests[0].url.query(), Some("user_id=3&date=2024-04-10"));
        assert_eq!(requests[1].url.query(), Some("date=2024-04-11"));
    }

    #[tokio::test]
    async fn adjustment_filter_drops_blank_fields() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/inventory/adjustments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1, "material_id": 2, "type": "entrada", "quantity": "5.00",
                "user_id": 1, "previous_stock": 10, "new_stock": 15,
                "created_at": "2024-04-10 08:00:00", "material_name": "Tapas"
            }])))
            .mount(&h.server)
            .await;

        let filter = AdjustmentFilter {
            material_name: Some("Tapas".into()),
            start_date: Some("".into()),
            end_date: None,
        };
        let rows = filter_adjustments(&h.client, &filter).await.unwrap();
        assert_eq!(rows[0].kind, "entrada");

        let requests = h.requests().await;
        assert_eq!(requests[0].url.query(), Some("material_name=Tapas"));
    }

    #[tokio::test]
    async fn movement_serializes_type_field() {
        let h = Harness::new().await;
        Mock::given(method("POST"))
            .and(path("/inventory/movements"))
            .and(body_json(json!({
                "material_id": 2, "quantity": 4.0, "employee_code": "E-17",
                "user_id": 1, "type": "entrada"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 55 })))
            .expect(1)
            .mount(&h.server)
            .await;

        let movement = Movement {
            material_id: 2,
            quantity: 4.0,
            reason: None,
            employee_code: "E-17".into(),
            user_id: 1,
            kind: "entrada".into(),
        };
        register_movement(&h.client, &movement).await.unwrap();
    }
}
