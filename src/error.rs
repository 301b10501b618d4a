//! Error types raised by the provider itself.
//!
//! Failures coming back from host collaborators are carried as
//! [`anyhow::Error`] and are never wrapped or rewritten here.

use std::path::PathBuf;

/// Invalid or schema-violating provider configuration.
///
/// Fatal at startup: a configuration that fails to load is never partially used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: {message}")]
    Invalid { path: String, message: String },

    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The host broke the calling contract of the provider.
///
/// This is an internal-invariant failure, not a user-facing error. Hosts should
/// abort the request with an internal error instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SSO contract violation: {0}")]
pub struct ContractViolation(pub &'static str);

/// The identity payload header could not be turned into an [`IdentityPayload`].
///
/// [`IdentityPayload`]: crate::httpsso::IdentityPayload
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("request has no {0} header")]
    MissingHeader(String),

    #[error("payload is neither JSON nor base64-encoded JSON")]
    Encoding,

    #[error("malformed identity payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_path() {
        let err = ConfigError::invalid("httpsso_config.json_header", "expected a string");
        assert_eq!(
            err.to_string(),
            "httpsso_config.json_header: expected a string"
        );
    }

    #[test]
    fn test_contract_violation_converts_to_anyhow() {
        let err: anyhow::Error = ContractViolation("no redirect URL").into();
        assert!(err.downcast_ref::<ContractViolation>().is_some());
        assert!(err.to_string().contains("no redirect URL"));
    }
}
