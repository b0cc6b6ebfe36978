//! Error kinds distinguished by the integration lifecycle.
//!
//! - [`ConfigurationError`]: a lookup outside the registry's closed set
//! - [`BackendError`]: a backend call failed (transport, status, or body)
//! - [`DisconnectRejected`]: the single-flight guard refused a disconnect
//!
//! Stale credential callbacks are not errors; see
//! [`ReceiveOutcome`](crate::controller::ReceiveOutcome).

use crate::integration::IntegrationType;
use thiserror::Error;

/// An integration type that the registry cannot resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Name does not match any known integration type
    #[error("unknown integration type '{0}'")]
    UnknownType(String),

    /// Known type, but the registry has no provider module for it
    #[error("no provider registered for {0}")]
    Unregistered(IntegrationType),
}

/// Failure of a call to the integrations backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a status other than 200
    #[error("backend returned status {status}")]
    Status {
        status: u16,
        /// `detail` field of a JSON error body, when there was one
        detail: Option<String>,
    },

    /// Backend answered 200 but the body could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Human-readable message supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status {
                detail: Some(detail),
                ..
            } => Some(detail.as_str()),
            _ => None,
        }
    }
}

/// Why a disconnect was refused before any network interaction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectRejected {
    #[error("no integration selected")]
    NoSelection,

    #[error("a disconnect of {0} is already in progress")]
    Busy(IntegrationType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_only_from_status_errors() {
        let err = BackendError::Status {
            status: 400,
            detail: Some("Token already revoked".to_string()),
        };
        assert_eq!(err.detail(), Some("Token already revoked"));

        let err = BackendError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "backend returned status 500");

        assert_eq!(BackendError::Malformed("eof".to_string()).detail(), None);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(DisconnectRejected::NoSelection.to_string(), "no integration selected");
        assert_eq!(
            DisconnectRejected::Busy(IntegrationType::HubSpot).to_string(),
            "a disconnect of HubSpot is already in progress"
        );
    }
}
