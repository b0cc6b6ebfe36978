//! Integration registry - Maps each integration type to its provider module
//! and backend endpoint.
//!
//! The selectable options are exactly the registered types, so lookups for
//! values taken from [`Registry::options`] never fail. Anything else is a
//! [`ConfigurationError`], never a fallback.

use crate::error::ConfigurationError;
use crate::integration::IntegrationType;
use crate::Provider;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Registry {
    providers: BTreeMap<IntegrationType, Arc<dyn Provider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under the type it reports. A later registration
    /// for the same type replaces the earlier one.
    pub fn register(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(provider.integration_type(), provider);
        self
    }

    /// Registered types, in presentation order.
    pub fn options(&self) -> Vec<IntegrationType> {
        self.providers.keys().copied().collect()
    }

    pub fn contains(&self, integration_type: IntegrationType) -> bool {
        self.providers.contains_key(&integration_type)
    }

    /// Provider module for `integration_type`.
    pub fn resolve_provider(
        &self,
        integration_type: IntegrationType,
    ) -> Result<Arc<dyn Provider>, ConfigurationError> {
        self.providers
            .get(&integration_type)
            .cloned()
            .ok_or(ConfigurationError::Unregistered(integration_type))
    }

    /// Backend endpoint slug for `integration_type`.
    pub fn resolve_endpoint(
        &self,
        integration_type: IntegrationType,
    ) -> Result<&'static str, ConfigurationError> {
        if !self.contains(integration_type) {
            return Err(ConfigurationError::Unregistered(integration_type));
        }
        Ok(integration_type.endpoint_slug())
    }

    /// Resolve user-supplied text to a registered type.
    pub fn parse(&self, name: &str) -> Result<IntegrationType, ConfigurationError> {
        let integration_type: IntegrationType = name.parse()?;
        if !self.contains(integration_type) {
            return Err(ConfigurationError::Unregistered(integration_type));
        }
        Ok(integration_type)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("options", &self.options())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::CredentialCallback;
    use crate::integration::{IntegrationParams, SessionIdentity};
    use async_trait::async_trait;

    struct NoopProvider(IntegrationType);

    #[async_trait]
    impl Provider for NoopProvider {
        fn integration_type(&self) -> IntegrationType {
            self.0
        }

        async fn connect(
            &self,
            _: SessionIdentity,
            _: IntegrationParams,
            _: CredentialCallback,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn registry_with(types: &[IntegrationType]) -> Registry {
        types.iter().fold(Registry::new(), |registry, ty| {
            registry.register(Arc::new(NoopProvider(*ty)))
        })
    }

    #[test]
    fn test_options_follow_enum_order() {
        let registry = registry_with(&[
            IntegrationType::HubSpot,
            IntegrationType::Notion,
            IntegrationType::Airtable,
        ]);
        assert_eq!(
            registry.options(),
            vec![
                IntegrationType::Notion,
                IntegrationType::Airtable,
                IntegrationType::HubSpot
            ]
        );
    }

    #[test]
    fn test_resolve_registered() {
        let registry = registry_with(&IntegrationType::ALL);
        for ty in registry.options() {
            assert_eq!(registry.resolve_provider(ty).unwrap().integration_type(), ty);
            assert_eq!(registry.resolve_endpoint(ty).unwrap(), ty.endpoint_slug());
        }
    }

    #[test]
    fn test_resolve_unregistered_fails() {
        let registry = registry_with(&[IntegrationType::Notion]);

        let err = registry.resolve_provider(IntegrationType::HubSpot).err().unwrap();
        assert_eq!(err, ConfigurationError::Unregistered(IntegrationType::HubSpot));

        let err = registry.resolve_endpoint(IntegrationType::Airtable).unwrap_err();
        assert_eq!(err, ConfigurationError::Unregistered(IntegrationType::Airtable));
    }

    #[test]
    fn test_parse() {
        let registry = registry_with(&[IntegrationType::Notion, IntegrationType::HubSpot]);
        assert_eq!(registry.parse("hubspot").unwrap(), IntegrationType::HubSpot);
        assert_eq!(
            registry.parse("Airtable").unwrap_err(),
            ConfigurationError::Unregistered(IntegrationType::Airtable)
        );
        assert_eq!(
            registry.parse("Dropbox").unwrap_err(),
            ConfigurationError::UnknownType("Dropbox".to_string())
        );
    }
}
