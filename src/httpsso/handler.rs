//! HTTP SSO login handling.
//!
//! Builds the redirect to the external SSO surface and completes logins once
//! the identity payload comes back.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::config::{ProviderConfig, ProviderSettings};
use super::types::{redirect_url_str, IdentityPayload, LoginContext};
use crate::host::{
    AccountStore, IdentityProvider, IdentityProviderRegistry, SsoCompletion, SsoLoginRequest,
    SsoRequest, UserAttributes, UserMapping,
};
use crate::localpart::{UserId, UsernameMapper};

/// Identifier of this provider in the host's external-id table.
pub const IDP_ID: &str = "httpsso";

/// Completes HTTP SSO logins against the host.
pub struct HttpSsoHandler {
    settings: ProviderSettings,
    server_name: String,
    store: Arc<dyn AccountStore>,
    sso: Arc<dyn SsoCompletion>,
    username_mapper: Arc<dyn UsernameMapper>,
}

impl HttpSsoHandler {
    /// Create a handler for an enabled provider.
    pub fn new(
        settings: ProviderSettings,
        server_name: impl Into<String>,
        store: Arc<dyn AccountStore>,
        sso: Arc<dyn SsoCompletion>,
        username_mapper: Arc<dyn UsernameMapper>,
    ) -> Self {
        Self {
            settings,
            server_name: server_name.into(),
            store,
            sso,
            username_mapper,
        }
    }

    /// Create a handler if the configuration enables the provider.
    pub fn from_config(
        config: &ProviderConfig,
        server_name: impl Into<String>,
        store: Arc<dyn AccountStore>,
        sso: Arc<dyn SsoCompletion>,
        username_mapper: Arc<dyn UsernameMapper>,
    ) -> Option<Self> {
        let settings = config.settings()?.clone();
        Some(Self::new(settings, server_name, store, sso, username_mapper))
    }

    /// Offer this provider to clients. Call once during startup.
    pub fn register(self: &Arc<Self>, registry: &dyn IdentityProviderRegistry) -> Result<()> {
        let provider: Arc<dyn IdentityProvider> = self.clone();
        registry.register_identity_provider(provider)
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Build the URL of the external SSO surface for this login attempt.
    pub fn handle_redirect_request(&self, context: &LoginContext) -> Result<String> {
        let (param, value) = match context {
            LoginContext::UiAuth { session_id } => ("session", session_id.as_str()),
            LoginContext::FreshLogin {
                client_redirect_url,
            } => ("redirectUrl", redirect_url_str(client_redirect_url)?),
        };

        let query = serde_urlencoded::to_string(&[(param, value)])?;
        let url = format!("{}?{}", self.settings.service_url, query);

        debug!(url = %url, "Created HTTP SSO redirect");
        Ok(url)
    }

    /// Complete the flow for a decoded identity payload.
    ///
    /// UI-Auth steps only need the raw external identity. Logins go through the
    /// host's login state machine with this provider's attribute mapping.
    pub async fn handle_payload(
        &self,
        request: &SsoRequest,
        payload: &IdentityPayload,
        context: &LoginContext,
    ) -> Result<()> {
        let client_redirect_url = match context {
            LoginContext::UiAuth { session_id } => {
                return self
                    .sso
                    .complete_sso_ui_auth_request(IDP_ID, &payload.user, session_id, request)
                    .await;
            }
            LoginContext::FreshLogin {
                client_redirect_url,
            } => redirect_url_str(client_redirect_url)?,
        };

        let mapping = self.user_mapping(payload);

        self.sso
            .complete_sso_login_request(SsoLoginRequest {
                idp_id: IDP_ID,
                remote_user_id: &payload.user,
                request,
                client_redirect_url,
                mapping: &mapping,
                registration_enabled: self.settings.enable_registration,
            })
            .await
    }

    /// The attribute mapping for a payload.
    pub fn user_mapping(&self, payload: &IdentityPayload) -> HttpSsoUserMapping {
        let localpart = self.username_mapper.map_username_to_localpart(&payload.user);

        HttpSsoUserMapping {
            user_id: UserId::new(localpart.as_str(), self.server_name.as_str()),
            attributes: UserAttributes {
                localpart,
                display_name: payload.user.clone(),
                emails: vec![payload.email.clone()],
            },
            store: Arc::clone(&self.store),
        }
    }
}

impl IdentityProvider for HttpSsoHandler {
    fn idp_id(&self) -> &str {
        IDP_ID
    }

    fn idp_name(&self) -> &str {
        &self.settings.idp_name
    }

    fn idp_icon(&self) -> Option<&str> {
        self.settings.idp_icon.as_deref()
    }

    fn idp_brand(&self) -> Option<&str> {
        self.settings.idp_brand.as_deref()
    }

    fn handle_redirect_request(&self, _request: &SsoRequest, context: &LoginContext) -> Result<String> {
        HttpSsoHandler::handle_redirect_request(self, context)
    }
}

/// Attribute mapping for one HTTP SSO identity.
///
/// There is exactly one candidate localpart per identity, so the host's
/// de-duplication retries must never happen.
pub struct HttpSsoUserMapping {
    user_id: UserId,
    attributes: UserAttributes,
    store: Arc<dyn AccountStore>,
}

impl HttpSsoUserMapping {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn attributes(&self) -> &UserAttributes {
        &self.attributes
    }
}

#[async_trait]
impl UserMapping for HttpSsoUserMapping {
    async fn map_user_attributes(&self, failures: u32) -> Result<UserAttributes> {
        // Grandfathering already claims any account with this localpart.
        if failures > 0 {
            bail!(
                "HTTP SSO is not expected to de-duplicate user IDs (failures: {})",
                failures
            );
        }

        Ok(self.attributes.clone())
    }

    async fn grandfather_existing_users(&self) -> Result<Option<String>> {
        // Older accounts were created before external ids were recorded.
        let user_id = self.user_id.to_string();
        debug!(user_id = %user_id, "Looking for existing account based on mapped user id");

        let users = self.store.get_users_by_id_case_insensitive(&user_id).await?;

        match users.into_keys().next() {
            Some(registered_user_id) => {
                info!(user_id = %registered_user_id, "Grandfathering mapping to existing account");
                Ok(Some(registered_user_id))
            }
            None => Ok(None),
        }
    }
}
