//! Integration Hub - lifecycle controller for third-party data-source integrations.
//!
//! A session (user + organization) attaches to one integration at a time,
//! sees whether a live credential exists for it, and revokes that credential
//! through a uniform, single-flight disconnect.
//!
//! # Architecture
//!
//! ```text
//!   user selects type ──► Registry ──► Provider (external flow)
//!          │                                  │
//!          ▼                                  ▼ credentials
//! ┌─────────────────────────────────────────────────────┐
//! │       IntegrationController                         │
//! │  - immutable IntegrationState snapshots             │
//! │  - stale-callback guard (type must match)           │
//! │  - single-flight disconnect ──► BackendClient       │
//! └─────────────────────────────────────────────────────┘
//!          │                          │
//!          ▼                          ▼
//!  CredentialHandoff          NotificationSink
//!  (data-retrieval form)      (success / error messages)
//! ```

// Data model
pub mod integration;

// Typed error kinds
pub mod error;

// Integrations backend HTTP client
pub mod backend;

// Type → provider/endpoint lookup
pub mod registry;

// State machine and disconnect protocol
pub mod controller;

// Downstream hand-off and UI projection
pub mod bridge;
pub mod view;

// User-visible notifications
pub mod notify;

// Configuration (TOML + env)
pub mod config;

mod provider;

pub use backend::BackendClient;
pub use controller::{DisconnectOutcome, IntegrationController, IntegrationState};
pub use notify::{MemorySink, NotificationKind, NotificationSink, TracingSink};
pub use provider::Provider;
pub use registry::Registry;
