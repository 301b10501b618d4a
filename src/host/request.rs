//! Per-request context passed through to the host.

use std::collections::HashMap;

/// The inbound HTTP request an SSO flow belongs to.
///
/// The provider only reads headers from it; the host uses it to finish the
/// flow (cookies, client IP, user agent for device naming).
#[derive(Debug, Clone, Default)]
pub struct SsoRequest {
    /// Request headers, as received.
    pub headers: HashMap<String, Vec<String>>,
    /// Client IP address, if known.
    pub client_ip: Option<String>,
}

impl SsoRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(|s| s.as_str())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = SsoRequest::new()
            .with_header("X-KVD-Payload", "first")
            .with_header("X-KVD-Payload", "second")
            .with_header("User-Agent", "Element/1.11");

        assert_eq!(request.header("x-kvd-payload"), Some("first"));
        assert_eq!(request.user_agent(), Some("Element/1.11"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn test_client_ip() {
        let request = SsoRequest::new().with_client_ip("192.0.2.10");
        assert_eq!(request.client_ip.as_deref(), Some("192.0.2.10"));
    }
}
