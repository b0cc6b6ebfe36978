use super::state::{IntegrationState, ReceiveOutcome};
use crate::backend::BackendClient;
use crate::bridge::CredentialHandoff;
use crate::error::ConfigurationError;
use crate::integration::{IntegrationParams, IntegrationType, SessionIdentity};
use crate::notify::{NotificationKind, NotificationSink};
use crate::registry::Registry;
use crate::view::IntegrationView;
use anyhow::{Context, Result};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Shared cell holding the current snapshot.
///
/// Transitions swap the whole snapshot under the lock; the lock is never
/// held across an await.
#[derive(Debug)]
pub(crate) struct StateCell(Mutex<IntegrationState>);

impl StateCell {
    pub(crate) fn new(state: IntegrationState) -> Self {
        Self(Mutex::new(state))
    }

    pub(crate) fn snapshot(&self) -> IntegrationState {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply `transition` atomically and return its side result.
    pub(crate) fn apply<R>(&self, transition: impl FnOnce(&IntegrationState) -> (IntegrationState, R)) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, result) = transition(&guard);
        *guard = next;
        result
    }

    pub(crate) fn update(&self, transition: impl FnOnce(&IntegrationState) -> IntegrationState) {
        self.apply(|state| (transition(state), ()))
    }
}

/// Hand-off point given to provider modules.
///
/// Cheap to clone and `'static`, so a provider may keep it for as long as
/// its flow takes.
#[derive(Clone)]
pub struct CredentialCallback {
    cell: Arc<StateCell>,
}

impl CredentialCallback {
    /// Deliver params from a provider. Ignored unless `params.integration_type`
    /// is still the selected type.
    pub fn receive(&self, params: IntegrationParams) -> ReceiveOutcome {
        receive_into(&self.cell, params)
    }
}

impl fmt::Debug for CredentialCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCallback").finish_non_exhaustive()
    }
}

fn receive_into(cell: &StateCell, params: IntegrationParams) -> ReceiveOutcome {
    let received = params.integration_type;
    let outcome = cell.apply(|state| state.receive_credentials(params));

    match &outcome {
        ReceiveOutcome::Stored => info!(integration = ?received, "Integration params updated"),
        ReceiveOutcome::Stale { received, selected } => debug!(
            received = ?received,
            selected = ?selected,
            "Discarding stale credential callback"
        ),
    }
    outcome
}

/// Integration lifecycle controller for one session.
///
/// Owns the state snapshot and the collaborators the transitions need:
/// the registry, the backend client and the notification sink. Clones share
/// the same state.
///
/// # Example
/// ```no_run
/// use integration_hub::{BackendClient, IntegrationController, Registry, TracingSink};
/// use integration_hub::integration::SessionIdentity;
/// use std::sync::Arc;
///
/// # async fn run(registry: Registry) -> anyhow::Result<()> {
/// let controller = IntegrationController::new(
///     Arc::new(registry),
///     BackendClient::new("http://localhost:8000"),
///     Arc::new(TracingSink),
///     SessionIdentity::default(),
/// );
///
/// controller.select_by_name("Notion")?;
/// controller.connect().await?;
/// if controller.is_connected() {
///     let _ = controller.disconnect().await;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IntegrationController {
    pub(crate) cell: Arc<StateCell>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) backend: BackendClient,
    pub(crate) notifier: Arc<dyn NotificationSink>,
}

impl IntegrationController {
    pub fn new(
        registry: Arc<Registry>,
        backend: BackendClient,
        notifier: Arc<dyn NotificationSink>,
        session: SessionIdentity,
    ) -> Self {
        Self {
            cell: Arc::new(StateCell::new(IntegrationState::new(session))),
            registry,
            backend,
            notifier,
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> IntegrationState {
        self.cell.snapshot()
    }

    /// Types the user may pick from.
    pub fn options(&self) -> Vec<IntegrationType> {
        self.registry.options()
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot().is_connected()
    }

    pub fn view(&self) -> IntegrationView {
        IntegrationView::project(&self.snapshot(), self.options())
    }

    /// Credentials for the data-retrieval form, if connected.
    pub fn handoff(&self) -> Option<CredentialHandoff> {
        CredentialHandoff::from_params(self.snapshot().params())
    }

    pub fn set_user(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        debug!(user_id = %user_id, "Session user changed");
        self.cell.update(|state| state.with_user(user_id));
    }

    pub fn set_org(&self, org_id: impl Into<String>) {
        let org_id = org_id.into();
        debug!(org_id = %org_id, "Session organization changed");
        self.cell.update(|state| state.with_org(org_id));
    }

    /// Select an integration type (or none). Params are cleared even when
    /// the type does not change.
    ///
    /// A type without a registered provider is refused and leaves the
    /// state untouched.
    pub fn select_type(&self, integration_type: Option<IntegrationType>) -> Result<(), ConfigurationError> {
        if let Some(ty) = integration_type {
            self.registry.resolve_provider(ty)?;
        }
        self.cell.update(|state| state.select_type(integration_type));
        info!(integration = ?integration_type, "Integration type selected");
        Ok(())
    }

    /// Select by display name or slug.
    pub fn select_by_name(&self, name: &str) -> Result<IntegrationType, ConfigurationError> {
        let integration_type = self.registry.parse(name)?;
        self.select_type(Some(integration_type))?;
        Ok(integration_type)
    }

    pub fn receive_credentials(&self, params: IntegrationParams) -> ReceiveOutcome {
        receive_into(&self.cell, params)
    }

    pub fn credential_callback(&self) -> CredentialCallback {
        CredentialCallback {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Run the selected provider's connection flow.
    ///
    /// Flow failures are reported through the notification sink and also
    /// returned to the caller.
    pub async fn connect(&self) -> Result<()> {
        let state = self.snapshot();
        let integration_type = state
            .selected()
            .context("Select an integration before connecting")?;
        let provider = self.registry.resolve_provider(integration_type)?;

        info!(
            integration = %integration_type,
            user_id = %state.session().user_id,
            org_id = %state.session().org_id,
            "Starting provider connection flow"
        );

        let result = provider
            .connect(
                state.session().clone(),
                state.params().clone(),
                self.credential_callback(),
            )
            .await
            .with_context(|| format!("Error connecting to {}", integration_type));

        if let Err(e) = &result {
            warn!(integration = %integration_type, error = %e, "Provider connection flow failed");
            self.notifier
                .notify(NotificationKind::Error, &format!("{:#}", e));
        }
        result
    }
}

impl fmt::Debug for IntegrationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationController")
            .field("state", &self.snapshot())
            .field("registry", &self.registry)
            .field("backend", &self.backend)
            .finish()
    }
}
