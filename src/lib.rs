//! HTTP SSO Identity Provider
//!
//! Lets a homeserver delegate login to an external, header-based SSO service.
//! The external service authenticates the user and returns an identity payload
//! (`{"user": .., "email": ..}`) in a transport header; this crate maps that
//! identity onto a local account and completes either a login or a UI-Auth
//! step through the host's SSO completion machinery.
//!
//! The host (account store, completion mediator, provider registry, username
//! mapping) is reached only through the traits in [`host`] and
//! [`localpart::UsernameMapper`].

pub mod error;
pub mod host;
pub mod httpsso;
pub mod localpart;

pub use error::{ConfigError, ContractViolation, PayloadError};
pub use host::{
    AccountStore, IdentityProvider, IdentityProviderRegistry, ProviderRegistry, SsoCompletion,
    SsoLoginRequest, SsoRequest, UserAttributes, UserMapping,
};
pub use httpsso::{HttpSsoHandler, IdentityPayload, LoginContext, ProviderConfig, IDP_ID};
pub use localpart::{MxidLocalpartMapper, UserId, UsernameMapper};
