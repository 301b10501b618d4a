//! Interfaces to the surrounding homeserver.
//!
//! The provider never touches storage, sessions or HTTP routing directly. Every
//! such concern is reached through one of the traits in this module, injected
//! at construction time.

pub mod account;
pub mod completion;
pub mod registry;
pub mod request;

pub use account::{AccountMatches, AccountStore, MemoryAccountStore};
pub use completion::{SsoCompletion, SsoLoginRequest, UserAttributes, UserMapping};
pub use registry::{IdentityProvider, IdentityProviderInfo, IdentityProviderRegistry, ProviderRegistry};
pub use request::SsoRequest;
