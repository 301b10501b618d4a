//! Registry of identity providers offered to clients.

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

use super::request::SsoRequest;
use crate::httpsso::LoginContext;

/// An SSO identity provider as seen by the host.
pub trait IdentityProvider: Send + Sync {
    /// Stable identifier, also the namespace of the provider's external ids.
    fn idp_id(&self) -> &str;

    /// User-facing name.
    fn idp_name(&self) -> &str;

    /// MXC URI of the provider icon.
    fn idp_icon(&self) -> Option<&str> {
        None
    }

    fn idp_brand(&self) -> Option<&str> {
        None
    }

    /// URL the client's browser must be sent to in order to start the flow.
    fn handle_redirect_request(&self, request: &SsoRequest, context: &LoginContext) -> Result<String>;
}

/// Presentation metadata of a provider, as listed in the login flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityProviderInfo {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl IdentityProviderInfo {
    pub fn of(provider: &dyn IdentityProvider) -> Self {
        Self {
            id: provider.idp_id().to_string(),
            name: provider.idp_name().to_string(),
            icon: provider.idp_icon().map(String::from),
            brand: provider.idp_brand().map(String::from),
        }
    }
}

/// The host's central SSO coordination service.
pub trait IdentityProviderRegistry: Send + Sync {
    /// Register a provider. Registering a second provider under an id already
    /// in use is an error.
    fn register_identity_provider(&self, provider: Arc<dyn IdentityProvider>) -> Result<()>;
}

/// In-memory provider registry.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn IdentityProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a provider by id.
    pub fn get(&self, idp_id: &str) -> Result<Option<Arc<dyn IdentityProvider>>> {
        let providers = self
            .providers
            .read()
            .map_err(|_| anyhow!("Provider registry lock poisoned"))?;
        Ok(providers.get(idp_id).cloned())
    }

    /// Presentation metadata of every registered provider, ordered by id.
    pub fn login_flows(&self) -> Result<Vec<IdentityProviderInfo>> {
        let providers = self
            .providers
            .read()
            .map_err(|_| anyhow!("Provider registry lock poisoned"))?;

        let mut infos: Vec<IdentityProviderInfo> = providers
            .values()
            .map(|p| IdentityProviderInfo::of(p.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }

    pub fn len(&self) -> usize {
        self.providers.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityProviderRegistry for ProviderRegistry {
    fn register_identity_provider(&self, provider: Arc<dyn IdentityProvider>) -> Result<()> {
        let mut providers = self
            .providers
            .write()
            .map_err(|_| anyhow!("Provider registry lock poisoned"))?;

        let idp_id = provider.idp_id().to_string();
        if providers.contains_key(&idp_id) {
            bail!("Identity provider '{}' is already registered", idp_id);
        }

        info!(idp_id = %idp_id, idp_name = %provider.idp_name(), "Registered identity provider");
        providers.insert(idp_id, provider);
        Ok(())
    }
}
