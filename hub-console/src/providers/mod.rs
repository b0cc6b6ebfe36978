//! Provider modules plugged into the registry.
//!
//! Notion, Airtable and HubSpot all authorize through the integrations
//! backend, so one flow implementation serves every type.

pub mod backend_oauth;

pub use backend_oauth::{AuthorizationPrompt, BackendOAuthProvider, ConsolePrompt};
