//! Disconnect protocol - single-flight credential revocation.
//!
//! 1. Pass the busy guard (`begin_disconnect`), or return the rejection
//!    without touching the network
//! 2. `POST {base}/integrations/{slug}/disconnect` with the session identity
//! 3. HTTP 200 → clear params, notify "`<Type>` disconnected successfully"
//! 4. Anything else → keep params, notify the backend's `detail` or a
//!    generic message naming the type
//! 5. Release the busy flag on every exit path, including cancellation

use super::session::{IntegrationController, StateCell};
use super::state::DisconnectTicket;
use crate::error::DisconnectRejected;
use crate::integration::IntegrationType;
use crate::notify::NotificationKind;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How a disconnect that passed the guard ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    Disconnected(IntegrationType),
    Failed {
        integration_type: IntegrationType,
        message: String,
    },
}

/// Releases the busy flag when dropped.
struct InFlightGuard {
    cell: Arc<StateCell>,
    ticket: DisconnectTicket,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.cell.update(|state| state.release_disconnect(&self.ticket));
        debug!(ticket = %self.ticket.id, "Disconnect busy flag released");
    }
}

fn success_message(integration_type: IntegrationType) -> String {
    format!("{} disconnected successfully", integration_type)
}

fn fallback_message(integration_type: IntegrationType) -> String {
    format!("Error disconnecting from {}", integration_type)
}

impl IntegrationController {
    /// Revoke the selected integration's credential.
    ///
    /// Callers are expected to check [`is_connected`](Self::is_connected)
    /// first; connectivity is not re-derived here.
    ///
    /// # Returns
    /// * `Ok(DisconnectOutcome)` - The request was made; outcome already notified
    /// * `Err(DisconnectRejected)` - Nothing selected, or another disconnect is running
    pub async fn disconnect(&self) -> Result<DisconnectOutcome, DisconnectRejected> {
        let (ticket, session) = self.cell.apply(|state| match state.begin_disconnect() {
            Ok((next, ticket)) => (next, Ok((ticket, state.session().clone()))),
            Err(rejected) => (state.clone(), Err(rejected)),
        })?;
        let guard = InFlightGuard {
            cell: Arc::clone(&self.cell),
            ticket,
        };
        let integration_type = guard.ticket.integration_type;

        info!(
            integration = %integration_type,
            user_id = %session.user_id,
            org_id = %session.org_id,
            ticket = %guard.ticket.id,
            "Disconnecting integration"
        );

        let result = match self.registry.resolve_endpoint(integration_type) {
            Ok(slug) => self
                .backend
                .disconnect(slug, &session)
                .await
                .map_err(|e| {
                    warn!(integration = %integration_type, error = %e, "Disconnect request failed");
                    e.detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| fallback_message(integration_type))
                }),
            Err(e) => {
                error!(integration = %integration_type, error = %e, "Cannot resolve disconnect endpoint");
                Err(fallback_message(integration_type))
            }
        };

        let current = self.cell.apply(|state| {
            let current = state.is_current(&guard.ticket);
            (state.complete_disconnect(&guard.ticket, result.is_ok()), current)
        });
        if !current {
            // The user picked another type while the request was in flight;
            // that selection's params were left alone.
            warn!(
                integration = %integration_type,
                ticket = %guard.ticket.id,
                "Disconnect completed after the selection changed"
            );
        }

        let elapsed_ms = (Utc::now() - guard.ticket.started_at).num_milliseconds();
        let outcome = match result {
            Ok(()) => {
                info!(integration = %integration_type, elapsed_ms, "Integration disconnected");
                self.notifier
                    .notify(NotificationKind::Success, &success_message(integration_type));
                DisconnectOutcome::Disconnected(integration_type)
            }
            Err(message) => {
                self.notifier.notify(NotificationKind::Error, &message);
                DisconnectOutcome::Failed {
                    integration_type,
                    message,
                }
            }
        };

        drop(guard);
        Ok(outcome)
    }
}
