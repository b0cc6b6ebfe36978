//! Default registry - one backend-brokered OAuth provider per integration type.

use crate::providers::{AuthorizationPrompt, BackendOAuthProvider};
use integration_hub::config::ProviderConfig;
use integration_hub::integration::IntegrationType;
use integration_hub::{BackendClient, Registry};
use std::sync::Arc;

/// Returns a registry with every supported integration.
pub fn default_registry(
    backend: &BackendClient,
    config: &ProviderConfig,
    prompt: Arc<dyn AuthorizationPrompt>,
) -> Registry {
    IntegrationType::ALL
        .into_iter()
        .fold(Registry::new(), |registry, integration_type| {
            registry.register(Arc::new(BackendOAuthProvider::new(
                integration_type,
                backend.clone(),
                Arc::clone(&prompt),
                config,
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ConsolePrompt;

    #[test]
    fn test_default_registry() {
        let registry = default_registry(
            &BackendClient::new("http://localhost:8000"),
            &ProviderConfig::default(),
            Arc::new(ConsolePrompt),
        );

        assert_eq!(
            registry.options(),
            vec![
                IntegrationType::Notion,
                IntegrationType::Airtable,
                IntegrationType::HubSpot
            ]
        );
        for ty in registry.options() {
            assert_eq!(registry.resolve_provider(ty).unwrap().integration_type(), ty);
        }
        assert_eq!(registry.resolve_endpoint(IntegrationType::HubSpot).unwrap(), "hubspot");
    }
}
