//! HTTP header SSO provider.
//!
//! Logins are delegated to an external SSO surface which authenticates the
//! user and hands an identity payload back to the homeserver in a transport
//! header. This module builds the redirect to that surface and completes the
//! login (or UI-Auth step) once the payload arrives.

pub mod config;
pub mod handler;
pub mod payload;
pub mod types;

pub use config::{HttpSsoConfigJson, ProviderConfig, ProviderSettings, SsoAttributeRequirement};
pub use handler::{HttpSsoHandler, HttpSsoUserMapping, IDP_ID};
pub use types::{IdentityPayload, LoginContext};
