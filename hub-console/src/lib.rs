//! Hub Console - runnable front end for the integration hub.
//!
//! Plugs concrete provider modules into the registry and drives one
//! session's [`IntegrationController`](integration_hub::IntegrationController)
//! from a line-oriented console.
//!
//! # Architecture
//!
//! ```text
//!      stdin commands
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Console                            │
//! │  - parse commands                        │
//! │  - spawn connect / disconnect tasks      │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       IntegrationController              │
//! │  - selection, credentials, disconnect    │
//! └─────────────────────────────────────────┘
//!          ↓                    ↑ credentials
//!   Integrations backend ← BackendOAuthProvider
//! ```

pub mod console;
pub mod providers;
pub mod registry;

pub use console::{Command, Console, ConsoleSink, Reply};
pub use providers::{AuthorizationPrompt, BackendOAuthProvider, ConsolePrompt};
pub use registry::default_registry;
