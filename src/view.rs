//! What a front end shows for the current state.

use crate::bridge::CredentialHandoff;
use crate::controller::IntegrationState;
use crate::integration::IntegrationType;
use serde::Serialize;

/// The disconnect button, when it is offered at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisconnectAffordance {
    pub label: String,
    /// False while a disconnect is in flight
    pub enabled: bool,
}

/// Read-only projection of [`IntegrationState`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntegrationView {
    pub user_id: String,
    pub org_id: String,
    pub options: Vec<IntegrationType>,
    pub selected: Option<IntegrationType>,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<DisconnectAffordance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<CredentialHandoff>,
}

impl IntegrationView {
    pub fn project(state: &IntegrationState, options: Vec<IntegrationType>) -> Self {
        let connected = state.is_connected();

        // Offered only for a selected, connected integration
        let disconnect = match state.selected() {
            Some(ty) if connected => Some(DisconnectAffordance {
                label: format!("Disconnect {}", ty),
                enabled: !state.is_disconnecting(),
            }),
            _ => None,
        };

        Self {
            user_id: state.session().user_id.clone(),
            org_id: state.session().org_id.clone(),
            options,
            selected: state.selected(),
            connected,
            disconnect,
            handoff: CredentialHandoff::from_params(state.params()),
        }
    }
}
