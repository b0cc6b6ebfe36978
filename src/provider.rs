use crate::controller::CredentialCallback;
use crate::integration::{IntegrationParams, IntegrationType, SessionIdentity};
use anyhow::Result;
use async_trait::async_trait;

/// Connection flow for one integration type.
///
/// Provider modules are pluggable: each drives its own flow (OAuth popup,
/// pasted token, anything else) and, whenever it has credentials, hands them
/// to the controller through the [`CredentialCallback`]. The controller does
/// not schedule or time the callback.
///
/// # Contract
/// - Call `callback.receive(...)` with params carrying at least `type` and
///   `credentials`. The type must be [`Provider::integration_type`].
/// - The callback may be invoked any number of times; the last call wins.
/// - Callbacks arriving after the user selected another type are discarded
///   by the controller.
///
/// # Example
/// ```no_run
/// use integration_hub::controller::CredentialCallback;
/// use integration_hub::integration::{IntegrationParams, IntegrationType, SessionIdentity};
/// use integration_hub::Provider;
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::json;
///
/// struct PastedTokenProvider {
///     token: String,
/// }
///
/// #[async_trait]
/// impl Provider for PastedTokenProvider {
///     fn integration_type(&self) -> IntegrationType {
///         IntegrationType::Notion
///     }
///
///     async fn connect(
///         &self,
///         _session: SessionIdentity,
///         mut current: IntegrationParams,
///         callback: CredentialCallback,
///     ) -> Result<()> {
///         current.integration_type = Some(IntegrationType::Notion);
///         current.credentials = Some(json!({ "token": self.token }));
///         callback.receive(current);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Integration type this module connects.
    fn integration_type(&self) -> IntegrationType;

    /// Run the connection flow for `session`.
    ///
    /// # Arguments
    /// * `session` - Identity the credentials are issued for
    /// * `current` - Params at the moment the flow started (metadata to carry over)
    /// * `callback` - Hand-off point for the resulting credentials
    ///
    /// # Returns
    /// * `Ok(())` - Flow finished (credentials delivered, or the user gave up)
    /// * `Err(...)` - Backend or flow failure, reported to the user by the controller
    async fn connect(
        &self,
        session: SessionIdentity,
        current: IntegrationParams,
        callback: CredentialCallback,
    ) -> Result<()>;
}
