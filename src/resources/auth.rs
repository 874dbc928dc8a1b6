//! Sign-in and sign-out.

use serde_json::json;
use tracing::{info, warn};

use crate::api::{ApiClient, QueryParams, RequestOptions};
use crate::error::{ApiError, ApiResult};
use crate::session::LoginSession;

pub const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Authenticate and record the returned session.
///
/// The request is sent without an `Authorization` header, so a stale stored
/// token cannot interfere. Any rejection by the backend is reported as
/// [`BAD_CREDENTIALS`]; transport failures are returned as they are.
pub async fn login(api: &ApiClient, username: &str, password: &str) -> ApiResult<LoginSession> {
    let body = json!({ "username": username, "password": password });
    let session: LoginSession = api
        .fetch_as(
            "/auth/login",
            RequestOptions::post(body).anonymous(),
            &QueryParams::new(),
        )
        .await
        .map_err(|e| match e {
            ApiError::Network(_) => e,
            other => {
                warn!(username, error = %other, "login rejected");
                other.with_message(BAD_CREDENTIALS)
            }
        })?;

    api.session().login(session.clone())?;
    info!(username, role = %session.role, "signed in");
    Ok(session)
}

pub fn logout(api: &ApiClient) {
    api.session().logout();
}
