//! Integration data model.
//!
//! Types shared by every layer of the hub: the closed set of integration
//! types, the session identity a user edits, and the parameter bag that
//! provider modules fill in once a connection succeeds.
//!
//! # Usage
//!
//! ```
//! use integration_hub::integration::{IntegrationParams, IntegrationType};
//! use serde_json::json;
//!
//! let ty: IntegrationType = "notion".parse().unwrap();
//! assert_eq!(ty.endpoint_slug(), "notion");
//!
//! let params = IntegrationParams::connected(ty, json!({"token": "abc"}));
//! assert!(params.has_credentials());
//! ```

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Default user id for a fresh session.
pub const DEFAULT_USER_ID: &str = "TestUser";

/// Default organization id for a fresh session.
pub const DEFAULT_ORG_ID: &str = "TestOrg";

/// Supported third-party data sources.
///
/// The enumeration is closed: anything the UI can offer is one of these
/// variants, so registry lookups are total over values that came from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntegrationType {
    Notion,
    Airtable,
    HubSpot,
}

impl IntegrationType {
    /// All integration types, in the order they are offered to the user.
    pub const ALL: [IntegrationType; 3] = [
        IntegrationType::Notion,
        IntegrationType::Airtable,
        IntegrationType::HubSpot,
    ];

    /// Human-readable name, used in notifications and labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            IntegrationType::Notion => "Notion",
            IntegrationType::Airtable => "Airtable",
            IntegrationType::HubSpot => "HubSpot",
        }
    }

    /// Path segment of the backend routes for this integration
    /// (`/integrations/{slug}/...`).
    pub fn endpoint_slug(&self) -> &'static str {
        match self {
            IntegrationType::Notion => "notion",
            IntegrationType::Airtable => "airtable",
            IntegrationType::HubSpot => "hubspot",
        }
    }
}

impl fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for IntegrationType {
    type Err = ConfigurationError;

    /// Accepts either the display name or the endpoint slug, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        IntegrationType::ALL
            .into_iter()
            .find(|ty| {
                ty.display_name().eq_ignore_ascii_case(needle)
                    || ty.endpoint_slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ConfigurationError::UnknownType(needle.to_string()))
    }
}

/// The user/organization pair a session acts on behalf of.
///
/// Edited directly by the user and passed through to the backend as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub org_id: String,
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: org_id.into(),
        }
    }

    /// Form fields sent with every backend call.
    pub(crate) fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("user_id", &self.user_id), ("org_id", &self.org_id)]
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID, DEFAULT_ORG_ID)
    }
}

/// Parameters of the current integration.
///
/// Opaque to the controller except for `credentials`: their presence is the
/// only signal that the session is connected. Providers may attach any extra
/// metadata, which is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationParams {
    /// Integration these params belong to
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub integration_type: Option<IntegrationType>,

    /// Credential blob issued by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,

    /// Provider-defined extras
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl IntegrationParams {
    /// Params announcing a successful connection.
    pub fn connected(integration_type: IntegrationType, credentials: Value) -> Self {
        Self {
            integration_type: Some(integration_type),
            credentials: Some(credentials),
            metadata: Map::new(),
        }
    }

    /// True when no field is set (the state right after a type change).
    pub fn is_empty(&self) -> bool {
        self.integration_type.is_none() && self.credentials.is_none() && self.metadata.is_empty()
    }

    /// True when a non-null credential blob is present.
    pub fn has_credentials(&self) -> bool {
        matches!(&self.credentials, Some(value) if !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_display_name_and_slug() {
        assert_eq!("Notion".parse::<IntegrationType>().unwrap(), IntegrationType::Notion);
        assert_eq!("airtable".parse::<IntegrationType>().unwrap(), IntegrationType::Airtable);
        assert_eq!(" HUBSPOT ".parse::<IntegrationType>().unwrap(), IntegrationType::HubSpot);
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = "Slack".parse::<IntegrationType>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownType("Slack".to_string()));
        assert!("".parse::<IntegrationType>().is_err());
    }

    #[test]
    fn test_endpoint_slugs() {
        let slugs: Vec<_> = IntegrationType::ALL.iter().map(|t| t.endpoint_slug()).collect();
        assert_eq!(slugs, vec!["notion", "airtable", "hubspot"]);
    }

    #[test]
    fn test_default_session() {
        let session = SessionIdentity::default();
        assert_eq!(session.user_id, "TestUser");
        assert_eq!(session.org_id, "TestOrg");
    }

    #[test]
    fn test_params_serialization_keeps_metadata() {
        let json = r#"{
            "type": "Airtable",
            "credentials": {"access_token": "tok"},
            "workspace": "ops"
        }"#;

        let params: IntegrationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.integration_type, Some(IntegrationType::Airtable));
        assert!(params.has_credentials());
        assert_eq!(params.metadata.get("workspace"), Some(&json!("ops")));

        let out = serde_json::to_string(&params).unwrap();
        assert!(out.contains("\"type\":\"Airtable\""));
        assert!(out.contains("\"workspace\":\"ops\""));
    }

    #[test]
    fn test_null_credentials_are_not_connected() {
        let params = IntegrationParams {
            integration_type: Some(IntegrationType::Notion),
            credentials: Some(Value::Null),
            metadata: Map::new(),
        };
        assert!(!params.has_credentials());
        assert!(IntegrationParams::default().is_empty());
    }
}
