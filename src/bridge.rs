//! Downstream consumer bridge.
//!
//! Read-only hand-off of connected credentials to the data-retrieval form.

use crate::integration::{IntegrationParams, IntegrationType};
use serde::Serialize;
use serde_json::Value;

/// What the data-retrieval form receives once a session is connected.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialHandoff {
    pub integration_type: IntegrationType,
    pub credentials: Value,
}

impl CredentialHandoff {
    /// `Some` exactly when `params` carry credentials for a known type.
    pub fn from_params(params: &IntegrationParams) -> Option<Self> {
        if !params.has_credentials() {
            return None;
        }
        Some(Self {
            integration_type: params.integration_type?,
            credentials: params.credentials.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handoff_requires_credentials() {
        assert!(CredentialHandoff::from_params(&IntegrationParams::default()).is_none());

        let params = IntegrationParams::connected(IntegrationType::Notion, json!({"token": "abc"}));
        let handoff = CredentialHandoff::from_params(&params).unwrap();
        assert_eq!(handoff.integration_type, IntegrationType::Notion);
        assert_eq!(handoff.credentials, json!({"token": "abc"}));
    }

    #[test]
    fn test_handoff_wire_format() {
        let params = IntegrationParams::connected(IntegrationType::HubSpot, json!("tok"));
        let json = serde_json::to_string(&CredentialHandoff::from_params(&params).unwrap()).unwrap();
        assert_eq!(json, r#"{"integrationType":"HubSpot","credentials":"tok"}"#);
    }
}
