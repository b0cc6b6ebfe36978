use crate::error::DisconnectRejected;
use crate::integration::{IntegrationParams, IntegrationType, SessionIdentity};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A disconnect that has passed the busy guard.
///
/// Tagged with the type and selection generation it was started for, so a
/// completion that arrives after the user moved on can be recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisconnectTicket {
    pub id: Uuid,
    pub integration_type: IntegrationType,
    pub generation: u64,
    pub started_at: DateTime<Utc>,
}

/// Result of handing params to [`IntegrationState::receive_credentials`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Params now belong to the selected integration
    Stored,
    /// Callback for a type that is no longer selected; discarded
    Stale {
        received: Option<IntegrationType>,
        selected: Option<IntegrationType>,
    },
}

/// Immutable snapshot of one session's integration state.
///
/// Every transition returns a new snapshot and leaves `self` untouched.
/// `in_flight` survives a type change: at most one disconnect runs per
/// session, whichever type it was started for.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationState {
    session: SessionIdentity,
    selected: Option<IntegrationType>,
    params: IntegrationParams,
    in_flight: Option<DisconnectTicket>,
    /// Bumped on every `select_type`
    generation: u64,
}

impl IntegrationState {
    /// Unselected state for `session`.
    pub fn new(session: SessionIdentity) -> Self {
        Self {
            session,
            selected: None,
            params: IntegrationParams::default(),
            in_flight: None,
            generation: 0,
        }
    }

    pub fn session(&self) -> &SessionIdentity {
        &self.session
    }

    pub fn selected(&self) -> Option<IntegrationType> {
        self.selected
    }

    pub fn params(&self) -> &IntegrationParams {
        &self.params
    }

    pub fn in_flight(&self) -> Option<&DisconnectTicket> {
        self.in_flight.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_connected(&self) -> bool {
        self.params.has_credentials()
    }

    pub fn is_disconnecting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn with_user(&self, user_id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.session.user_id = user_id.into();
        next
    }

    pub fn with_org(&self, org_id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.session.org_id = org_id.into();
        next
    }

    /// Select `integration_type` (or nothing). Params are cleared in the
    /// same step, so nothing from the previous type is visible afterwards.
    pub fn select_type(&self, integration_type: Option<IntegrationType>) -> Self {
        Self {
            session: self.session.clone(),
            selected: integration_type,
            params: IntegrationParams::default(),
            in_flight: self.in_flight.clone(),
            generation: self.generation + 1,
        }
    }

    /// Store params from a provider callback if they are for the selected type.
    pub fn receive_credentials(&self, params: IntegrationParams) -> (Self, ReceiveOutcome) {
        match self.selected {
            Some(selected) if params.integration_type == Some(selected) => {
                let mut next = self.clone();
                next.params = params;
                (next, ReceiveOutcome::Stored)
            }
            selected => (
                self.clone(),
                ReceiveOutcome::Stale {
                    received: params.integration_type,
                    selected,
                },
            ),
        }
    }

    /// Pass the busy guard, or report why not. On rejection nothing changes.
    pub fn begin_disconnect(&self) -> Result<(Self, DisconnectTicket), DisconnectRejected> {
        if let Some(ticket) = &self.in_flight {
            return Err(DisconnectRejected::Busy(ticket.integration_type));
        }
        let integration_type = self.selected.ok_or(DisconnectRejected::NoSelection)?;

        let ticket = DisconnectTicket {
            id: Uuid::new_v4(),
            integration_type,
            generation: self.generation,
            started_at: Utc::now(),
        };
        let mut next = self.clone();
        next.in_flight = Some(ticket.clone());
        Ok((next, ticket))
    }

    /// Fold a disconnect result into params, leaving the busy flag alone.
    ///
    /// Success clears params only while the selection the ticket was issued
    /// for is still current; failure never touches them.
    pub fn complete_disconnect(&self, ticket: &DisconnectTicket, succeeded: bool) -> Self {
        let mut next = self.clone();
        if succeeded && self.is_current(ticket) {
            next.params = IntegrationParams::default();
        }
        next
    }

    /// Clear the busy flag if `ticket` is the disconnect in flight.
    pub fn release_disconnect(&self, ticket: &DisconnectTicket) -> Self {
        let mut next = self.clone();
        if matches!(&self.in_flight, Some(current) if current.id == ticket.id) {
            next.in_flight = None;
        }
        next
    }

    /// [`complete_disconnect`](Self::complete_disconnect) followed by
    /// [`release_disconnect`](Self::release_disconnect).
    pub fn end_disconnect(&self, ticket: &DisconnectTicket, succeeded: bool) -> Self {
        self.complete_disconnect(ticket, succeeded)
            .release_disconnect(ticket)
    }

    /// True if no `select_type` happened since `ticket` was issued.
    pub fn is_current(&self, ticket: &DisconnectTicket) -> bool {
        ticket.generation == self.generation && Some(ticket.integration_type) == self.selected
    }
}

impl Default for IntegrationState {
    fn default() -> Self {
        Self::new(SessionIdentity::default())
    }
}
