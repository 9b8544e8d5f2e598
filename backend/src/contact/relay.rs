//! Outbound relay call.
//!
//! The relay is a third-party script that forwards submissions to the
//! association's mailbox. Its answer is not readable by this client, so a
//! successful [`RelayTransport::dispatch`] only means the request left
//! without a network error. Whether the relay accepted it is unknown.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::config::{Settings, REQUEST_TIMEOUT};
use crate::error::{RelayError, RelayResult};
use crate::logs::{log_error, log_info};

/// Body posted to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPayload {
    pub sender_name: String,
    pub sender_email: String,
    pub message: String,
    /// Recipient as "NOM Prenom".
    pub alumni_name: String,
    /// Recipient credential or `N/A`.
    pub alumni_bac: String,
    /// `report` for error reports; absent for plain contact.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Something that can send a payload to the relay.
pub trait RelayTransport {
    /// Dispatch the payload. `Ok` means sent, not delivered.
    fn dispatch(&self, payload: &RelayPayload) -> impl Future<Output = RelayResult<()>>;
}

impl<R: RelayTransport + ?Sized> RelayTransport for &R {
    fn dispatch(&self, payload: &RelayPayload) -> impl Future<Output = RelayResult<()>> {
        (**self).dispatch(payload)
    }
}

/// Posts payloads as `text/plain` JSON, which needs no preflight.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.relay_url.clone()).with_timeout(settings.request_timeout)
    }

    /// Use a specific HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RelayTransport for HttpRelay {
    async fn dispatch(&self, payload: &RelayPayload) -> RelayResult<()> {
        let body = serde_json::to_string(payload).map_err(|e| RelayError::Transport(e.to_string()))?;

        log_info(format!("Sending message for {} to relay", payload.alumni_name));

        // The response is dropped unread; only transport errors count.
        self.client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map(drop)
            .map_err(|e| {
                log_error(format!("Relay request failed: {}", e));
                RelayError::Transport(e.to_string())
            })
    }
}
