//! HTTP client for the integrations backend.
//!
//! Every route lives under `{base_url}/integrations/{slug}/` and takes the
//! session identity as form fields `user_id` and `org_id`. Only HTTP 200
//! counts as success; error bodies may carry a JSON `detail` string.

use crate::error::BackendError;
use crate::integration::SessionIdentity;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Error body shape returned by the backend.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for the integrations backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url` (e.g. "http://localhost:8000").
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Revoke the session's credential for the integration at `slug`.
    pub async fn disconnect(&self, slug: &str, session: &SessionIdentity) -> Result<(), BackendError> {
        self.post(slug, "disconnect", session).await.map(|_| ())
    }

    /// Start an authorization flow; returns the URL the user must visit.
    pub async fn authorize(&self, slug: &str, session: &SessionIdentity) -> Result<String, BackendError> {
        let response = self.post(slug, "authorize", session).await?;
        decode(response).await
    }

    /// Fetch the credentials stored for the session once authorization completed.
    pub async fn credentials(&self, slug: &str, session: &SessionIdentity) -> Result<Value, BackendError> {
        let response = self.post(slug, "credentials", session).await?;
        decode(response).await
    }

    fn route(&self, slug: &str, action: &str) -> String {
        format!("{}/integrations/{}/{}", self.base_url, slug, action)
    }

    async fn post(
        &self,
        slug: &str,
        action: &str,
        session: &SessionIdentity,
    ) -> Result<Response, BackendError> {
        let url = self.route(slug, action);
        debug!(url = %url, user_id = %session.user_id, org_id = %session.org_id, "Backend request");

        let response = self
            .http_client
            .post(&url)
            .form(&session.form_fields())
            .send()
            .await?;

        check_response_status(response).await
    }
}

/// Turn anything but 200 into a [`BackendError::Status`], pulling `detail`
/// out of the body when it is JSON of the expected shape.
async fn check_response_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|b| b.detail);

    debug!(status = status.as_u16(), detail = ?detail, "Backend request failed");

    Err(BackendError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| BackendError::Malformed(e.to_string()))
}
