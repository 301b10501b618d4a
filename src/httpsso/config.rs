//! HTTP SSO provider configuration.
//!
//! The provider is configured through the `httpsso_config` section of the host
//! configuration. The section is read once at startup and the resulting
//! [`ProviderConfig`] is immutable for the life of the process.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Name of the host configuration section holding the provider settings.
pub const CONFIG_SECTION: &str = "httpsso_config";

/// Header carrying the identity payload when `json_header` is not set.
pub const DEFAULT_JSON_HEADER: &str = "x-kvd-payload";

/// User-facing provider name when `idp_name` is not set.
pub const DEFAULT_IDP_NAME: &str = "SSO";

/// Client login path served by the external SSO surface, relative to the
/// public base URL.
pub const LOGIN_PATH: &str = "_matrix/client/r0/login/httpsso";

/// Raw `httpsso_config` section as written by the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSsoConfigJson {
    pub enabled: Option<bool>,
    pub json_header: Option<String>,
    pub enable_registration: Option<bool>,
    pub idp_name: Option<String>,
    pub idp_icon: Option<String>,
    pub idp_brand: Option<String>,
    /// Attribute name -> required value (`null` means "must be present").
    pub required_attributes: Option<Value>,
}

/// A single required-attribute rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoAttributeRequirement {
    pub attribute: String,
    /// Required value, or `None` if any value is accepted.
    pub value: Option<String>,
}

/// Settings of an enabled provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Transport header carrying the encoded identity payload.
    pub json_header: String,
    /// Login URL of the external SSO surface.
    pub service_url: String,
    /// Whether unknown users may be registered on first login.
    pub enable_registration: bool,
    pub idp_name: String,
    /// MXC URI of the provider icon.
    pub idp_icon: Option<String>,
    /// Brand identifier for clients that theme their login buttons.
    pub idp_brand: Option<String>,
    pub required_attributes: Vec<SsoAttributeRequirement>,
}

/// Validated provider configuration.
///
/// Derived fields only exist while the provider is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    settings: Option<ProviderSettings>,
}

impl ProviderConfig {
    /// A configuration with the provider switched off.
    pub fn disabled() -> Self {
        Self { settings: None }
    }

    /// Resolve the provider from a full host configuration mapping.
    pub fn from_host_config(config: &Value, public_baseurl: &str) -> Result<Self, ConfigError> {
        Self::from_section(config.get(CONFIG_SECTION), public_baseurl)
    }

    /// Resolve the provider from the `httpsso_config` section alone.
    ///
    /// A missing or `null` section disables the provider. A present section
    /// enables it unless `enabled` is false or `null`; the other keys are only
    /// read once the provider is known to be enabled.
    pub fn from_section(section: Option<&Value>, public_baseurl: &str) -> Result<Self, ConfigError> {
        let section = match section {
            None | Some(Value::Null) => return Ok(Self::disabled()),
            Some(section) => section,
        };

        if !section_enabled(section)? {
            debug!("HTTP SSO provider disabled by configuration");
            return Ok(Self::disabled());
        }

        let raw: HttpSsoConfigJson = serde_json::from_value(section.clone())
            .map_err(|e| ConfigError::invalid(CONFIG_SECTION, e.to_string()))?;

        let public_baseurl = normalize_public_baseurl(public_baseurl)?;

        let required_attributes = match raw.required_attributes {
            None | Some(Value::Null) => Vec::new(),
            Some(ref value) => parse_required_attributes(value)?,
        };

        Ok(Self {
            settings: Some(ProviderSettings {
                json_header: raw
                    .json_header
                    .unwrap_or_else(|| DEFAULT_JSON_HEADER.to_string()),
                service_url: format!("{}{}", public_baseurl, LOGIN_PATH),
                enable_registration: raw.enable_registration.unwrap_or(true),
                idp_name: raw.idp_name.unwrap_or_else(|| DEFAULT_IDP_NAME.to_string()),
                idp_icon: raw.idp_icon,
                idp_brand: raw.idp_brand,
                required_attributes,
            }),
        })
    }

    /// Read a JSON host configuration file and resolve the provider from it.
    pub fn load(path: impl AsRef<Path>, public_baseurl: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Value = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_host_config(&config, public_baseurl)
    }

    /// Check if the provider is enabled.
    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    pub fn settings(&self) -> Option<&ProviderSettings> {
        self.settings.as_ref()
    }

    /// Consume the config, returning the enabled settings.
    pub fn into_settings(self) -> Option<ProviderSettings> {
        self.settings
    }

    pub fn payload_header_name(&self) -> Option<&str> {
        self.settings.as_ref().map(|s| s.json_header.as_str())
    }

    pub fn service_url(&self) -> Option<&str> {
        self.settings.as_ref().map(|s| s.service_url.as_str())
    }
}

/// Validate `required_attributes`: an object whose values are strings or null.
pub fn parse_required_attributes(value: &Value) -> Result<Vec<SsoAttributeRequirement>, ConfigError> {
    let path = format!("{}.required_attributes", CONFIG_SECTION);

    let map = value
        .as_object()
        .ok_or_else(|| ConfigError::invalid(&path, "expected an object"))?;

    map.iter()
        .map(|(attribute, value)| match value {
            Value::String(s) => Ok(SsoAttributeRequirement {
                attribute: attribute.clone(),
                value: Some(s.clone()),
            }),
            Value::Null => Ok(SsoAttributeRequirement {
                attribute: attribute.clone(),
                value: None,
            }),
            _ => Err(ConfigError::invalid(
                format!("{}.{}", path, attribute),
                "expected a string or null",
            )),
        })
        .collect()
}

/// Read `enabled` from a present section. Omitted means on, `null` means off.
fn section_enabled(section: &Value) -> Result<bool, ConfigError> {
    match section.get("enabled") {
        None => Ok(true),
        Some(Value::Null) => Ok(false),
        Some(Value::Bool(enabled)) => Ok(*enabled),
        Some(_) => Err(ConfigError::invalid(
            format!("{}.enabled", CONFIG_SECTION),
            "expected a boolean",
        )),
    }
}

fn normalize_public_baseurl(public_baseurl: &str) -> Result<String, ConfigError> {
    let trimmed = public_baseurl.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(
            "public_baseurl",
            "a public base URL is required when HTTP SSO is enabled",
        ));
    }
    Ok(format!("{}/", trimmed))
}
