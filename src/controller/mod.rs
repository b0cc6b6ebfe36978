//! Integration state controller.
//!
//! [`IntegrationState`] is an immutable snapshot with pure transitions:
//!
//! ```text
//! Unselected --select_type--> Selected(disconnected)
//! Selected(disconnected) --receive_credentials(match)--> Selected(connected)
//! Selected(connected) --begin_disconnect--> Disconnecting
//! Disconnecting --end_disconnect(success)--> Selected(disconnected)
//! Disconnecting --end_disconnect(failure)--> Selected(connected)
//! any --select_type(new)--> Selected(disconnected) for the new type
//! ```
//!
//! [`IntegrationController`] holds the snapshot for one session and runs the
//! asynchronous parts (provider flows, the disconnect protocol) against it.

mod disconnect;
mod session;
mod state;

pub use disconnect::DisconnectOutcome;
pub use session::{CredentialCallback, IntegrationController};
pub use state::{DisconnectTicket, IntegrationState, ReceiveOutcome};
