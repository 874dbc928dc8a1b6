//! Bottle labels and the daily labelling session.
//!
//! Labels are numbered per day. The first label generated opens the day's
//! session; closing it freezes the counter until it is reopened.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{path_segment, ApiClient, QueryParams};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Label {
    pub id: i64,
    pub sequence_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    pub quantity: i64,
    pub date: String,
    pub created_at: String,
    pub status: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SessionInfo {
    pub date: String,
    pub total_labels: i64,
    pub total_bottles: i64,
    pub current_counter: i64,
    pub is_active: bool,
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionSummary {
    pub session_summary: SessionInfo,
    pub closed_at: String,
    pub closed_by: i64,
}

/// Result of closing the day's session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionClose {
    #[serde(default)]
    pub message: String,
    pub data: SessionSummary,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelFilter {
    pub date: Option<String>,
    pub status: Option<String>,
    pub product_id: Option<i64>,
}

impl LabelFilter {
    pub fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_opt("date", self.date.as_deref())
            .push_opt("status", self.status.as_deref())
            .push_opt("product_id", self.product_id.filter(|id| *id != 0));
        q
    }
}

/// `{ success, message?, data?, error? }` envelope of the label endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> ApiResult<T> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(ApiError::InvalidResponse(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "label response carried no data".into()),
            )),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<i64>,
}

#[derive(Serialize)]
struct PrintRequest<'a> {
    label_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    printer_name: Option<&'a str>,
}

pub async fn session_info(api: &ApiClient) -> ApiResult<SessionInfo> {
    api.get::<Envelope<_>>("/labels/session").await?.into_data()
}

/// Generate `quantity` consecutive labels in today's session.
pub async fn generate(
    api: &ApiClient,
    quantity: u32,
    description: Option<&str>,
    product_id: Option<i64>,
) -> ApiResult<Vec<Label>> {
    if quantity == 0 {
        return Err(ApiError::InvalidRequest(
            "label quantity must be at least 1".into(),
        ));
    }
    let body = GenerateRequest {
        quantity,
        description,
        product_id,
    };
    api.post::<_, Envelope<_>>("/labels/generate", &body)
        .await?
        .into_data()
}

pub async fn today(api: &ApiClient) -> ApiResult<Vec<Label>> {
    api.get::<Envelope<_>>("/labels/today").await?.into_data()
}

/// Labels of one day (`YYYY-MM-DD`).
pub async fn by_date(api: &ApiClient, date: &str) -> ApiResult<Vec<Label>> {
    let date = path_segment(date)?;
    api.get::<Envelope<_>>(&format!("/labels/date/{date}"))
        .await?
        .into_data()
}

pub async fn filter(api: &ApiClient, filter: &LabelFilter) -> ApiResult<Vec<Label>> {
    api.get_with::<Envelope<_>>("/labels/filter", &filter.to_query())
        .await?
        .into_data()
}

pub async fn update_status(api: &ApiClient, id: i64, status: &str) -> ApiResult<()> {
    api.patch::<_, Value>(&format!("/labels/{id}/status"), &json!({ "status": status }))
        .await?;
    Ok(())
}

/// Ask the backend to print a label; `printer_name` picks a printer other
/// than its default.
pub async fn print(api: &ApiClient, label_id: i64, printer_name: Option<&str>) -> ApiResult<()> {
    let body = PrintRequest {
        label_id,
        printer_name,
    };
    api.post::<_, Value>("/labels/print", &body).await?;
    Ok(())
}

pub async fn get(api: &ApiClient, id: i64) -> ApiResult<Label> {
    api.get::<Envelope<_>>(&format!("/labels/{id}"))
        .await?
        .into_data()
}

pub async fn print_history(api: &ApiClient, id: i64) -> ApiResult<Vec<Value>> {
    api.get::<Envelope<_>>(&format!("/labels/{id}/print-history"))
        .await?
        .into_data()
}

/// Close today's session.
pub async fn end_session(api: &ApiClient) -> ApiResult<SessionClose> {
    api.post::<_, Envelope<_>>("/labels/session/end", &json!({}))
        .await?
        .into_data()
}

/// Per-day totals between two dates, inclusive.
pub async fn stats(api: &ApiClient, start_date: &str, end_date: &str) -> ApiResult<Vec<Value>> {
    let query = QueryParams::new()
        .with("start_date", start_date)
        .with("end_date", end_date);
    api.get_with::<Envelope<_>>("/labels/stats", &query)
        .await?
        .into_data()
}

/// Reopen a closed day. Returns the backend response unchanged.
pub async fn reopen_session(api: &ApiClient, date: &str) -> ApiResult<Value> {
    let date = path_segment(date)?;
    api.post(&format!("/labels/session/{date}/reopen"), &json!({}))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::Harness;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn label(id: i64, seq: &str) -> Value {
        json!({
            "id": id,
            "sequence_number": seq,
            "quantity": 1,
            "date": "2024-06-03",
            "created_at": "2024-06-03T08:15:00Z",
            "status": "generated",
            "user_name": "Ana"
        })
    }

    fn session() -> Value {
        json!({
            "date": "2024-06-03",
            "total_labels": 12,
            "total_bottles": 12,
            "current_counter": 12,
            "is_active": true,
            "is_closed": false,
            "created_by": 3
        })
    }

    #[tokio::test]
    async fn session_info_unwraps_envelope() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/session"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": session() })),
            )
            .expect(1)
            .mount(&h.server)
            .await;

        let info = session_info(&h.client).await.unwrap();
        assert_eq!(info.current_counter, 12);
        assert!(info.is_active);
        assert_eq!(info.created_by, Some(3));
        assert_eq!(info.closed_at, None);
    }

    #[tokio::test]
    async fn generate_omits_unset_optional_fields() {
        let h = Harness::new().await;
        Mock::given(method("POST"))
            .and(path("/labels/generate"))
            .and(body_json(json!({ "quantity": 2, "description": "Botellón 5 gal" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": [label(1, "20240603-0001"), label(2, "20240603-0002")]
            })))
            .expect(1)
            .mount(&h.server)
            .await;

        let labels = generate(&h.client, 2, Some("Botellón 5 gal"), None)
            .await
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].sequence_number, "20240603-0002");
    }

    #[tokio::test]
    async fn generate_rejects_zero_quantity_without_request() {
        let h = Harness::new().await;
        let err = generate(&h.client, 0, None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(h.requests().await.is_empty());
    }

    #[tokio::test]
    async fn today_and_by_date_list_labels() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/today"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "data": [label(7, "20240603-0007")]
            })))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/labels/date/2024-05-31"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })),
            )
            .expect(1)
            .mount(&h.server)
            .await;

        assert_eq!(today(&h.client).await.unwrap()[0].id, 7);
        assert!(by_date(&h.client, "2024-05-31").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn by_date_keeps_date_inside_one_segment() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })),
            )
            .mount(&h.server)
            .await;

        by_date(&h.client, "2024/05/31").await.unwrap();
        let err = reopen_session(&h.client, "..").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));

        let requests = h.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/labels/date/2024%2F05%2F31");
    }

    #[tokio::test]
    async fn filter_sends_only_set_fields() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/filter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "data": [label(4, "20240603-0004")]
            })))
            .mount(&h.server)
            .await;

        let filter_by = LabelFilter {
            status: Some("printed".into()),
            date: Some(String::new()),
            product_id: Some(0),
        };
        filter(&h.client, &filter_by).await.unwrap();
        filter(
            &h.client,
            &LabelFilter {
                date: Some("2024-06-03".into()),
                product_id: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let requests = h.requests().await;
        assert_eq!(requests[0].url.query(), Some("status=printed"));
        assert_eq!(
            requests[1].url.query(),
            Some("date=2024-06-03&product_id=5")
        );
    }

    #[tokio::test]
    async fn update_status_and_print_send_expected_bodies() {
        let h = Harness::new().await;
        Mock::given(method("PATCH"))
            .and(path("/labels/9/status"))
            .and(body_json(json!({ "status": "void" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&h.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/labels/print"))
            .and(body_json(json!({ "label_id": 9, "printer_name": "Zebra-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&h.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/labels/print"))
            .and(body_json(json!({ "label_id": 10 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&h.server)
            .await;

        update_status(&h.client, 9, "void").await.unwrap();
        print(&h.client, 9, Some("Zebra-1")).await.unwrap();
        print(&h.client, 10, None).await.unwrap();
    }

    #[tokio::test]
    async fn get_and_print_history() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "data": label(4, "20240603-0004")
            })))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/labels/4/print-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "printed_at": "2024-06-03T09:00:00Z", "printer_name": "Zebra-1" }]
            })))
            .mount(&h.server)
            .await;

        let found = get(&h.client, 4).await.unwrap();
        assert_eq!(found.user_name, "Ana");
        assert_eq!(found.printed_at, None);

        let history = print_history(&h.client, 4).await.unwrap();
        assert_eq!(history[0]["printer_name"], "Zebra-1");
    }

    #[tokio::test]
    async fn end_session_returns_summary() {
        let h = Harness::new().await;
        let mut closed = session();
        closed["is_closed"] = json!(true);
        Mock::given(method("POST"))
            .and(path("/labels/session/end"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "message": "Sesión cerrada",
                    "data": {
                        "session_summary": closed,
                        "closed_at": "2024-06-03T18:00:00Z",
                        "closed_by": 3
                    }
                }
            })))
            .expect(1)
            .mount(&h.server)
            .await;

        let close = end_session(&h.client).await.unwrap();
        assert_eq!(close.message, "Sesión cerrada");
        assert!(close.data.session_summary.is_closed);
        assert_eq!(close.data.closed_by, 3);
    }

    #[tokio::test]
    async fn stats_sends_date_range() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "date": "2024-06-01", "total_labels": 40 }]
            })))
            .mount(&h.server)
            .await;

        let rows = stats(&h.client, "2024-06-01", "2024-06-07").await.unwrap();
        assert_eq!(rows[0]["total_labels"], 40);

        let requests = h.requests().await;
        assert_eq!(
            requests[0].url.query(),
            Some("start_date=2024-06-01&end_date=2024-06-07")
        );
    }

    #[tokio::test]
    async fn reopen_returns_whole_response() {
        let h = Harness::new().await;
        Mock::given(method("POST"))
            .and(path("/labels/session/2024-06-03/reopen"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Sesión reabierta"
            })))
            .expect(1)
            .mount(&h.server)
            .await;

        let resp = reopen_session(&h.client, "2024-06-03").await.unwrap();
        assert_eq!(resp["message"], "Sesión reabierta");
    }

    #[tokio::test]
    async fn missing_data_is_an_invalid_response() {
        let h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/labels/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false, "error": "No hay sesión activa"
            })))
            .mount(&h.server)
            .await;

        let err = session_info(&h.client).await.unwrap_err();
        match err {
            ApiError::InvalidResponse(msg) => assert_eq!(msg, "No hay sesión activa"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
