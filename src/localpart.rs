//! Mapping of external usernames to local account identifiers.

use std::fmt;

/// Deterministic mapping from an external identity string to a localpart.
///
/// Provided by the host so that every SSO provider derives the same localpart
/// for the same username.
pub trait UsernameMapper: Send + Sync {
    fn map_username_to_localpart(&self, username: &str) -> String;
}

/// The conventional username -> localpart mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MxidLocalpartMapper {
    /// Keep case information by escaping uppercase letters instead of folding them.
    pub case_sensitive: bool,
}

impl MxidLocalpartMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl UsernameMapper for MxidLocalpartMapper {
    fn map_username_to_localpart(&self, username: &str) -> String {
        map_username_to_mxid_localpart(username, self.case_sensitive)
    }
}

/// Map an arbitrary username onto the localpart character set.
///
/// Uppercase ASCII is folded (or escaped as `_x` when `case_sensitive`), every
/// other byte outside `a-z0-9_-./+` becomes `=xx`, and a leading `_` is
/// escaped as `=5f`.
pub fn map_username_to_mxid_localpart(username: &str, case_sensitive: bool) -> String {
    let mut localpart = String::with_capacity(username.len());

    for &byte in username.as_bytes() {
        match byte {
            b'A'..=b'Z' if case_sensitive => {
                localpart.push('_');
                localpart.push(byte.to_ascii_lowercase() as char);
            }
            b'A'..=b'Z' => localpart.push(byte.to_ascii_lowercase() as char),
            b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'/' | b'+' => {
                localpart.push(byte as char)
            }
            _ => localpart.push_str(&format!("={:02x}", byte)),
        }
    }

    if localpart.starts_with('_') {
        localpart.replace_range(..1, "=5f");
    }

    localpart
}

/// Fully qualified local account identifier, `@localpart:server_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId {
    localpart: String,
    server_name: String,
}

impl UserId {
    pub fn new(localpart: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            localpart: localpart.into(),
            server_name: server_name.into(),
        }
    }

    pub fn localpart(&self) -> &str {
        &self.localpart
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.localpart, self.server_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(username: &str) -> String {
        MxidLocalpartMapper::new().map_username_to_localpart(username)
    }

    #[test]
    fn test_plain_username_unchanged() {
        assert_eq!(map("alice"), "alice");
        assert_eq!(map("bob.smith-2/ops+x"), "bob.smith-2/ops+x");
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(map("Alice"), "alice");
        assert_eq!(map("ALICE"), map("alice"));
    }

    #[test]
    fn test_case_sensitive_escapes_uppercase() {
        let mapper = MxidLocalpartMapper::case_sensitive();
        assert_eq!(mapper.map_username_to_localpart("bobSmith"), "bob_smith");
        // Leading underscore produced by the escape is itself escaped.
        assert_eq!(mapper.map_username_to_localpart("Alice"), "=5falice");
    }

    #[test]
    fn test_disallowed_characters_hex_escaped() {
        assert_eq!(map("jean luc"), "jean=20luc");
        assert_eq!(map("a=b"), "a=3db");
        assert_eq!(map("alice@example.com"), "alice=40example.com");
        assert_eq!(map("josé"), "jos=c3=a9");
    }

    #[test]
    fn test_leading_underscore_escaped() {
        assert_eq!(map("_admin"), "=5fadmin");
        assert_eq!(map("admin_"), "admin_");
    }

    #[test]
    fn test_user_id_display() {
        let user_id = UserId::new("alice", "hs.example.com");
        assert_eq!(user_id.to_string(), "@alice:hs.example.com");
        assert_eq!(user_id.localpart(), "alice");
        assert_eq!(user_id.server_name(), "hs.example.com");
    }
}
