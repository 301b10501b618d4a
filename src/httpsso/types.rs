//! Per-request SSO types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;

/// Identity asserted by the external SSO service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    /// External username, also the remote user id.
    pub user: String,
    pub email: String,
}

/// What the user is signing in for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginContext {
    /// A fresh login; the client is sent back to `client_redirect_url` afterwards.
    FreshLogin { client_redirect_url: Vec<u8> },
    /// Re-authentication for an ongoing UI-Auth session.
    UiAuth { session_id: String },
}

impl LoginContext {
    pub fn fresh_login(client_redirect_url: impl Into<Vec<u8>>) -> Self {
        Self::FreshLogin {
            client_redirect_url: client_redirect_url.into(),
        }
    }

    pub fn ui_auth(session_id: impl Into<String>) -> Self {
        Self::UiAuth {
            session_id: session_id.into(),
        }
    }

    /// Build a context from the two optional values a host request carries.
    ///
    /// Exactly one must be present. An empty session id counts as absent.
    pub fn from_parts(
        client_redirect_url: Option<Vec<u8>>,
        ui_auth_session_id: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let session_id = ui_auth_session_id.filter(|s| !s.is_empty());

        match (client_redirect_url, session_id) {
            (None, Some(session_id)) => Ok(Self::UiAuth { session_id }),
            (Some(client_redirect_url), None) => Ok(Self::FreshLogin { client_redirect_url }),
            (None, None) => Err(ContractViolation(
                "neither a client redirect URL nor a UI-Auth session id was supplied",
            )),
            (Some(_), Some(_)) => Err(ContractViolation(
                "both a client redirect URL and a UI-Auth session id were supplied",
            )),
        }
    }

    pub fn ui_auth_session_id(&self) -> Option<&str> {
        match self {
            Self::UiAuth { session_id } => Some(session_id),
            Self::FreshLogin { .. } => None,
        }
    }
}

/// Decode a client redirect URL received as raw bytes.
pub(crate) fn redirect_url_str(client_redirect_url: &[u8]) -> Result<&str> {
    std::str::from_utf8(client_redirect_url).context("Client redirect URL is not valid UTF-8")
}
