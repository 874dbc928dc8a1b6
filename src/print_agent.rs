//! Client for the local receipt-printer agent.
//!
//! The agent is a small HTTP service on the workstation that turns a
//! receipt document into thermal-printer output. Documents are opaque JSON
//! here; their layout is owned by the caller.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum PrintError {
    /// Connection refused or timed out: the agent is not running.
    #[error("The print agent at {url} is not reachable")]
    Unreachable { url: String },

    /// The agent answered with a non-success status.
    #[error("The print agent rejected the document ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The agent accepted the request but reported a printing failure, or
    /// the request could not be sent at all.
    #[error("Printing failed: {0}")]
    Failed(String),
}

impl PrintError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PrintError::Unreachable { .. })
    }
}

#[derive(Clone)]
pub struct PrintAgent {
    http: Client,
    url: String,
}

impl PrintAgent {
    pub fn new(config: &ClientConfig) -> Result<Self, PrintError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PrintError::Failed(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: config.print_agent_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one document to the agent.
    pub async fn print(&self, document: &Value) -> Result<(), PrintError> {
        debug!(url = %self.url, "sending document to print agent");

        let response = self
            .http
            .post(&self.url)
            .json(document)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    warn!(url = %self.url, error = %e, "print agent unreachable");
                    PrintError::Unreachable {
                        url: self.url.clone(),
                    }
                } else {
                    PrintError::Failed(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let reply = serde_json::from_str::<Value>(&text).ok();
        let message = reply
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if !status.is_success() {
            return Err(PrintError::Rejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| status.to_string()),
            });
        }

        let reported_failure = reply
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(Value::as_bool)
            == Some(false);
        if reported_failure {
            return Err(PrintError::Failed(
                message.unwrap_or_else(|| "the agent reported an error".to_string()),
            ));
        }

        Ok(())
    }
}
