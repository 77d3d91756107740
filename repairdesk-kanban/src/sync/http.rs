//! HTTP client for the ERP placement endpoint.

use super::{RemoteSync, SyncError};
use crate::config::SyncConfig;
use crate::engine::Placement;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Extract a human-readable message from a JSON error body.
///
/// Tries `message`, then `error`, then falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }
    body.to_string()
}

/// Sends `PATCH {base_url}{placement_path}` with the placement as JSON.
#[derive(Debug, Clone)]
pub struct HttpSync {
    client: Client,
    base_url: Url,
    placement_path: String,
    token: Option<String>,
}

impl HttpSync {
    /// Build a client from configuration. The timeout is enforced by the
    /// controller, not here.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let mut base_url = Url::parse(&config.base_url)?;
        // placement paths resolve under the base path, not the host root
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            placement_path: config.placement_path.clone(),
            token: config.token.clone(),
        })
    }

    /// URL of the placement resource for one assignment
    pub fn placement_url(&self, placement: &Placement) -> Result<Url, SyncError> {
        let id = placement.assignment_id.to_string();
        let path = self
            .placement_path
            .replace("{id}", &urlencoding::encode(&id));
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl RemoteSync for HttpSync {
    async fn persist(&self, placement: &Placement) -> Result<(), SyncError> {
        let url = self.placement_url(placement)?;
        debug!(%url, assignment = %placement.assignment_id, "persisting placement");

        let mut request = self.client.patch(url).json(placement);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(
            status = status.as_u16(),
            assignment = %placement.assignment_id,
            "placement rejected: {}",
            message
        );
        Err(SyncError::rejected(status.as_u16(), message))
    }
}
