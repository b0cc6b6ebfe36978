//! Backend-brokered OAuth connection flow.
//!
//! 1. `POST /integrations/{slug}/authorize` → authorization URL
//! 2. Show the URL to the user
//! 3. Poll `POST /integrations/{slug}/credentials` until the backend has
//!    finished the OAuth callback (a 400 means "not yet")
//! 4. Hand `{ type, credentials }` to the controller

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use integration_hub::config::ProviderConfig;
use integration_hub::controller::{CredentialCallback, ReceiveOutcome};
use integration_hub::error::BackendError;
use integration_hub::integration::{IntegrationParams, IntegrationType, SessionIdentity};
use integration_hub::{BackendClient, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shows an authorization URL to the user.
#[async_trait]
pub trait AuthorizationPrompt: Send + Sync {
    async fn present(&self, integration_type: IntegrationType, url: &str) -> Result<()>;
}

/// Prints the URL on stdout.
pub struct ConsolePrompt;

#[async_trait]
impl AuthorizationPrompt for ConsolePrompt {
    async fn present(&self, integration_type: IntegrationType, url: &str) -> Result<()> {
        println!("Open this URL to authorize {}:\n  {}", integration_type, url);
        Ok(())
    }
}

/// OAuth flow brokered by the integrations backend.
pub struct BackendOAuthProvider {
    integration_type: IntegrationType,
    backend: BackendClient,
    prompt: Arc<dyn AuthorizationPrompt>,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl BackendOAuthProvider {
    pub fn new(
        integration_type: IntegrationType,
        backend: BackendClient,
        prompt: Arc<dyn AuthorizationPrompt>,
        config: &ProviderConfig,
    ) -> Self {
        Self {
            integration_type,
            backend,
            prompt,
            poll_interval: config.poll_interval(),
            max_poll_attempts: config.max_poll_attempts,
        }
    }
}

#[async_trait]
impl Provider for BackendOAuthProvider {
    fn integration_type(&self) -> IntegrationType {
        self.integration_type
    }

    async fn connect(
        &self,
        session: SessionIdentity,
        mut current: IntegrationParams,
        callback: CredentialCallback,
    ) -> Result<()> {
        let slug = self.integration_type.endpoint_slug();

        let url = self
            .backend
            .authorize(slug, &session)
            .await
            .map_err(describe)
            .context("Failed to start authorization")?;
        self.prompt.present(self.integration_type, &url).await?;

        for attempt in 1..=self.max_poll_attempts {
            match self.backend.credentials(slug, &session).await {
                Ok(credentials) if !credentials.is_null() => {
                    current.integration_type = Some(self.integration_type);
                    current.credentials = Some(credentials);

                    match callback.receive(current) {
                        ReceiveOutcome::Stored => {
                            info!(integration = %self.integration_type, attempt, "Credentials received")
                        }
                        ReceiveOutcome::Stale { selected, .. } => info!(
                            integration = %self.integration_type,
                            selected = ?selected,
                            "Credentials arrived after the selection changed"
                        ),
                    }
                    return Ok(());
                }
                Ok(_) | Err(BackendError::Status { status: 400, .. }) => {
                    debug!(integration = %self.integration_type, attempt, "Authorization pending");
                }
                Err(e) => {
                    return Err(describe(e)).context("Failed to fetch credentials");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        bail!(
            "Authorization for {} not completed after {} attempts",
            self.integration_type,
            self.max_poll_attempts
        )
    }
}

/// Prefer the backend's own explanation over the status line.
fn describe(e: BackendError) -> anyhow::Error {
    match e.detail() {
        Some(detail) => anyhow::anyhow!("{}", detail),
        None => anyhow::Error::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use integration_hub::{IntegrationController, MemorySink, Registry};
    use mockito::Server;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPrompt {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AuthorizationPrompt for RecordingPrompt {
        async fn present(&self, _: IntegrationType, url: &str) -> Result<()> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn setup(
        base_url: String,
        ty: IntegrationType,
        max_poll_attempts: u32,
    ) -> (IntegrationController, Arc<RecordingPrompt>) {
        let backend = BackendClient::new(base_url);
        let prompt = Arc::new(RecordingPrompt::default());
        let config = ProviderConfig {
            poll_interval_ms: 1,
            max_poll_attempts,
        };
        let registry = Registry::new().register(Arc::new(BackendOAuthProvider::new(
            ty,
            backend.clone(),
            prompt.clone(),
            &config,
        )));
        let controller = IntegrationController::new(
            Arc::new(registry),
            backend,
            Arc::new(MemorySink::new()),
            SessionIdentity::default(),
        );
        controller.select_type(Some(ty)).unwrap();
        (controller, prompt)
    }

    #[tokio::test]
    async fn test_connect_flow() {
        let mut server = Server::new_async().await;
        let authorize = server
            .mock("POST", "/integrations/notion/authorize")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#""https://api.notion.com/v1/oauth/authorize?state=abc""#)
            .create_async()
            .await;
        let credentials = server
            .mock("POST", "/integrations/notion/credentials")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"secret_xyz","workspace_name":"Ops"}"#)
            .create_async()
            .await;

        let (controller, prompt) = setup(server.url(), IntegrationType::Notion, 3);
        controller.connect().await.unwrap();

        assert_eq!(
            prompt.urls.lock().unwrap().as_slice(),
            ["https://api.notion.com/v1/oauth/authorize?state=abc"]
        );
        let handoff = controller.handoff().unwrap();
        assert_eq!(handoff.integration_type, IntegrationType::Notion);
        assert_eq!(handoff.credentials["access_token"], json!("secret_xyz"));

        authorize.assert_async().await;
        credentials.assert_async().await;
    }

    #[tokio::test]
    async fn test_connect_gives_up_after_max_attempts() {
        let mut server = Server::new_async().await;
        let _authorize = server
            .mock("POST", "/integrations/hubspot/authorize")
            .with_status(200)
            .with_body(r#""https://app.hubspot.com/oauth/authorize""#)
            .create_async()
            .await;
        let pending = server
            .mock("POST", "/integrations/hubspot/credentials")
            .with_status(400)
            .with_body(r#"{"detail":"No credentials found."}"#)
            .expect(2)
            .create_async()
            .await;

        let (controller, _) = setup(server.url(), IntegrationType::HubSpot, 2);
        let err = controller.connect().await.unwrap_err();

        assert!(format!("{:#}", err).contains("not completed after 2 attempts"));
        assert!(!controller.is_connected());
        pending.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_credentials_keep_polling() {
        let mut server = Server::new_async().await;
        let _authorize = server
            .mock("POST", "/integrations/airtable/authorize")
            .with_status(200)
            .with_body(r#""https://airtable.com/oauth2/v1/authorize""#)
            .create_async()
            .await;
        let _credentials = server
            .mock("POST", "/integrations/airtable/credentials")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let (controller, _) = setup(server.url(), IntegrationType::Airtable, 2);
        assert!(controller.connect().await.is_err());
        assert!(!controller.is_connected());
    }

    #[tokio::test]
    async fn test_authorize_failure_uses_detail() {
        let mut server = Server::new_async().await;
        let _authorize = server
            .mock("POST", "/integrations/notion/authorize")
            .with_status(500)
            .with_body(r#"{"detail":"Notion client id not configured"}"#)
            .create_async()
            .await;

        let (controller, prompt) = setup(server.url(), IntegrationType::Notion, 2);
        let err = controller.connect().await.unwrap_err();

        assert!(format!("{:#}", err).contains("Notion client id not configured"));
        assert!(prompt.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_while_polling_aborts() {
        let mut server = Server::new_async().await;
        let _authorize = server
            .mock("POST", "/integrations/notion/authorize")
            .with_status(200)
            .with_body(r#""https://api.notion.com/v1/oauth/authorize""#)
            .create_async()
            .await;
        let failing = server
            .mock("POST", "/integrations/notion/credentials")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let (controller, _) = setup(server.url(), IntegrationType::Notion, 5);
        let err = controller.connect().await.unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to fetch credentials"));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_credentials_after_switch_are_discarded() {
        let mut server = Server::new_async().await;
        let _authorize = server
            .mock("POST", "/integrations/notion/authorize")
            .with_status(200)
            .with_body(r#""https://api.notion.com/v1/oauth/authorize""#)
            .create_async()
            .await;
        let _credentials = server
            .mock("POST", "/integrations/notion/credentials")
            .with_status(200)
            .with_body(r#"{"access_token":"late"}"#)
            .create_async()
            .await;

        let (controller, prompt) = setup(server.url(), IntegrationType::Notion, 2);
        let provider = BackendOAuthProvider::new(
            IntegrationType::Notion,
            BackendClient::new(server.url()),
            prompt,
            &ProviderConfig::default(),
        );
        let callback = controller.credential_callback();

        // User moves away before the flow finishes
        controller.select_type(None).unwrap();
        provider
            .connect(SessionIdentity::default(), IntegrationParams::default(), callback)
            .await
            .unwrap();

        assert!(!controller.is_connected());
        assert!(controller.snapshot().params().is_empty());
    }
}
