//! The host's shared SSO completion mediator.
//!
//! Every identity provider finishes its flow by handing the external identity
//! to the host, which owns external-id tracking, account matching, registration
//! and the final login redirect. Providers plug into that state machine through
//! [`UserMapping`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::request::SsoRequest;

/// Canonical attributes used to create or match a local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub localpart: String,
    pub display_name: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Provider callbacks driven by the host during login completion.
#[async_trait]
pub trait UserMapping: Send + Sync {
    /// Produce attributes for a new account.
    ///
    /// `failures` counts earlier attempts whose localpart was already taken.
    async fn map_user_attributes(&self, failures: u32) -> Result<UserAttributes>;

    /// Find a pre-existing account to reuse for an identity the host has never
    /// seen before. `None` lets the host carry on with registration.
    async fn grandfather_existing_users(&self) -> Result<Option<String>>;
}

/// Arguments of a login completion.
pub struct SsoLoginRequest<'a> {
    /// Provider the identity came from.
    pub idp_id: &'a str,
    /// External identity, used by the host as the de-duplication key.
    pub remote_user_id: &'a str,
    pub request: &'a SsoRequest,
    /// Where the client goes once logged in.
    pub client_redirect_url: &'a str,
    pub mapping: &'a dyn UserMapping,
    /// Whether the host may create an account when nothing matches.
    pub registration_enabled: bool,
}

impl fmt::Debug for SsoLoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoLoginRequest")
            .field("idp_id", &self.idp_id)
            .field("remote_user_id", &self.remote_user_id)
            .field("client_redirect_url", &self.client_redirect_url)
            .field("registration_enabled", &self.registration_enabled)
            .finish_non_exhaustive()
    }
}

/// Login and UI-Auth completion, implemented by the host.
#[async_trait]
pub trait SsoCompletion: Send + Sync {
    async fn complete_sso_login_request(&self, login: SsoLoginRequest<'_>) -> Result<()>;

    async fn complete_sso_ui_auth_request(
        &self,
        idp_id: &str,
        remote_user_id: &str,
        ui_auth_session_id: &str,
        request: &SsoRequest,
    ) -> Result<()>;
}
