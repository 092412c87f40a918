//! Structured connection definition carried by an access key.

use super::ServerDomainError;
use std::collections::BTreeMap;
use std::net::Ipv6Addr;

/// Cipher methods accepted in access keys.
pub const KNOWN_CIPHER_METHODS: &[&str] = &[
    "2022-blake3-aes-128-gcm",
    "2022-blake3-aes-256-gcm",
    "2022-blake3-chacha20-poly1305",
    "aes-128-cfb",
    "aes-128-ctr",
    "aes-128-gcm",
    "aes-192-cfb",
    "aes-192-ctr",
    "aes-192-gcm",
    "aes-256-cfb",
    "aes-256-ctr",
    "aes-256-gcm",
    "bf-cfb",
    "camellia-128-cfb",
    "camellia-192-cfb",
    "camellia-256-cfb",
    "chacha20",
    "chacha20-ietf",
    "chacha20-ietf-poly1305",
    "rc4-md5",
    "salsa20",
    "xchacha20-ietf-poly1305",
];

/// Characters that may not appear in a host name.
const FORBIDDEN_HOST_CHARACTERS: &[char] = &['/', '?', '#', '@', '[', ']', '\\', '%'];

/// Validated connection definition for a proxy server.
///
/// Host, port, method, and password are always present. Extension
/// parameters are carried through untouched and kept sorted by key so the
/// canonical access key is deterministic.
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::domain::ServiceConfig;
///
/// let config = ServiceConfig::new("127.0.0.1", 1080, "chacha20-ietf-poly1305", "secret")
///     .expect("valid configuration")
///     .with_tag("office")
///     .with_extra("plugin", "obfs-local;obfs=http");
/// assert_eq!(config.port(), 1080);
/// assert_eq!(config.tag(), Some("office"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceConfig {
    host: String,
    port: u16,
    method: String,
    password: String,
    tag: Option<String>,
    extra: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Creates a validated connection definition.
    ///
    /// IPv6 literals are accepted without brackets and stored in their
    /// normalized textual form.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::InvalidServiceConfiguration`] when any
    /// required field is missing or malformed, or when the cipher method is
    /// unknown.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        method: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ServerDomainError> {
        let normalized_host = normalize_host(&host.into())?;
        if port == 0 {
            return Err(ServerDomainError::invalid_configuration(
                "port must be between 1 and 65535",
            ));
        }

        let method_value = method.into();
        if method_value.is_empty() {
            return Err(ServerDomainError::invalid_configuration(
                "cipher method is missing",
            ));
        }
        if !KNOWN_CIPHER_METHODS.contains(&method_value.as_str()) {
            return Err(ServerDomainError::invalid_configuration(format!(
                "unsupported cipher method '{method_value}'"
            )));
        }

        let password_value = password.into();
        if password_value.is_empty() {
            return Err(ServerDomainError::invalid_configuration(
                "password is missing",
            ));
        }

        Ok(Self {
            host: normalized_host,
            port,
            method: method_value,
            password: password_value,
            tag: None,
            extra: BTreeMap::new(),
        })
    }

    /// Sets the display tag. Empty tags are ignored.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let value = tag.into();
        self.tag = (!value.is_empty()).then_some(value);
        self
    }

    /// Adds an extension parameter, replacing any previous value for `key`.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the host name or IP literal (IPv6 without brackets).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the cipher method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the display tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns the extension parameters.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Returns whether the host is an IPv6 literal.
    #[must_use]
    pub fn is_ipv6_host(&self) -> bool {
        self.host.contains(':')
    }

    /// Returns `true` when both definitions reach the same endpoint with the
    /// same credentials. Tags and extension parameters are ignored.
    #[must_use]
    pub fn same_endpoint(&self, other: &Self) -> bool {
        self.host == other.host
            && self.port == other.port
            && self.method == other.method
            && self.password == other.password
    }
}

fn normalize_host(raw: &str) -> Result<String, ServerDomainError> {
    let host = raw
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(raw);

    if host.is_empty() {
        return Err(ServerDomainError::invalid_configuration("host is missing"));
    }

    if host.contains(':') {
        return host
            .parse::<Ipv6Addr>()
            .map(|address| address.to_string())
            .map_err(|_| {
                ServerDomainError::invalid_configuration(format!("invalid IPv6 host '{host}'"))
            });
    }

    let has_forbidden = host
        .chars()
        .any(|character| character.is_whitespace() || FORBIDDEN_HOST_CHARACTERS.contains(&character));
    if has_forbidden {
        return Err(ServerDomainError::invalid_configuration(format!(
            "invalid host '{host}'"
        )));
    }

    Ok(host.to_owned())
}
