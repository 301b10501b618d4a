//! Decoding of the identity payload header.

use base64::{
    engine::general_purpose::{STANDARD as BASE64, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};

use super::types::IdentityPayload;
use crate::error::PayloadError;
use crate::host::SsoRequest;

impl IdentityPayload {
    /// Decode a header value holding the payload as JSON or base64-encoded JSON.
    pub fn from_header_value(value: &str) -> Result<Self, PayloadError> {
        let value = value.trim();

        if value.starts_with('{') {
            return Ok(serde_json::from_str(value)?);
        }

        let decoded = [&BASE64, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(value).ok())
            .ok_or(PayloadError::Encoding)?;

        Ok(serde_json::from_slice(&decoded)?)
    }

    /// Extract the payload from the named request header.
    pub fn from_request(request: &SsoRequest, header_name: &str) -> Result<Self, PayloadError> {
        let value = request
            .header(header_name)
            .ok_or_else(|| PayloadError::MissingHeader(header_name.to_string()))?;

        Self::from_header_value(value)
    }
}
