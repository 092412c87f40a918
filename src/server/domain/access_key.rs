//! Access-key parsing and canonical serialization.
//!
//! Access keys are `ss://` URIs. Three input forms are accepted:
//!
//! - SIP002 with base64 user info: `ss://BASE64(method:password)@host:port/?k=v#name`
//! - SIP002 with percent-encoded plain user info: `ss://method:password@host:port/#name`
//! - Legacy: `ss://BASE64(method:password@host:port)#name`
//!
//! Serialization always produces the SIP002 form with unpadded URL-safe
//! base64 user info, a bracketed IPv6 host, a `/` path, extension parameters
//! sorted by key, and a percent-encoded name fragment.

use super::{ServerDomainError, ServiceConfig};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use std::borrow::Cow;
use url::{Host, Url};

/// URI scheme identifying access keys.
pub const ACCESS_KEY_SCHEME: &str = "ss";

const SCHEME_PREFIX: &str = "ss://";

/// Parses an untrusted access key into a validated connection definition.
///
/// The optional fragment becomes the definition's tag. Query parameters are
/// kept as extension parameters without semantic validation.
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::domain::parse_access_key;
///
/// let config = parse_access_key(
///     "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTp0ZXN0@127.0.0.1:1080/#home",
/// )
/// .expect("valid access key");
/// assert_eq!(config.host(), "127.0.0.1");
/// assert_eq!(config.method(), "chacha20-ietf-poly1305");
/// assert_eq!(config.tag(), Some("home"));
/// ```
///
/// # Errors
///
/// Returns [`ServerDomainError::InvalidServiceConfiguration`] when the key is
/// empty, uses another scheme, has malformed URI syntax or percent-encoding,
/// or lacks a host, port, method, or password.
pub fn parse_access_key(input: &str) -> Result<ServiceConfig, ServerDomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ServerDomainError::invalid_configuration(
            "access key is empty",
        ));
    }

    let body = strip_scheme(trimmed)?;
    let (location, fragment) = match body.split_once('#') {
        Some((location, fragment)) => (location, Some(fragment)),
        None => (body, None),
    };

    let (authority, query) = match location.split_once('?') {
        Some((authority, query)) => (authority, Some(query)),
        None => (location, None),
    };

    // User info is split off before URI parsing: standard base64 may
    // contain '/', which would otherwise end the authority.
    let config = match authority.rsplit_once('@') {
        Some((user_info, host_port)) => parse_sip002(user_info, host_port, query)?,
        None => parse_legacy(location)?,
    };

    match fragment {
        Some(raw) => Ok(config.with_tag(decode_component(raw, "name")?)),
        None => Ok(config),
    }
}

/// Serializes a connection definition into its canonical access key.
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::domain::{ServiceConfig, to_access_key};
///
/// let config = ServiceConfig::new("::1", 443, "chacha20-ietf-poly1305", "test")
///     .expect("valid configuration");
/// assert_eq!(
///     to_access_key(&config),
///     "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTp0ZXN0@[::1]:443/",
/// );
/// ```
#[must_use]
pub fn to_access_key(config: &ServiceConfig) -> String {
    let user_info = URL_SAFE_NO_PAD.encode(format!("{}:{}", config.method(), config.password()));
    let host = if config.is_ipv6_host() {
        format!("[{}]", config.host())
    } else {
        config.host().to_owned()
    };

    let mut key = format!("{SCHEME_PREFIX}{user_info}@{host}:{}/", config.port());
    if !config.extra().is_empty() {
        let query = config
            .extra()
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        key.push('?');
        key.push_str(&query);
    }
    if let Some(tag) = config.tag() {
        key.push('#');
        key.push_str(&urlencoding::encode(tag));
    }
    key
}

fn strip_scheme(input: &str) -> Result<&str, ServerDomainError> {
    let (scheme, rest) = input
        .split_once("://")
        .ok_or_else(|| ServerDomainError::invalid_configuration("access key must be a URI"))?;
    if !scheme.eq_ignore_ascii_case(ACCESS_KEY_SCHEME) {
        return Err(ServerDomainError::invalid_configuration(format!(
            "unsupported access key scheme '{scheme}'"
        )));
    }
    Ok(rest)
}

fn parse_sip002(
    user_info: &str,
    host_port: &str,
    query: Option<&str>,
) -> Result<ServiceConfig, ServerDomainError> {
    let url = Url::parse(&format!("{SCHEME_PREFIX}{host_port}")).map_err(|err| {
        ServerDomainError::invalid_configuration(format!("malformed access key: {err}"))
    })?;

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_owned(),
        Some(Host::Ipv4(address)) => address.to_string(),
        Some(Host::Ipv6(address)) => address.to_string(),
        None => return Err(ServerDomainError::invalid_configuration("host is missing")),
    };
    let port = url
        .port()
        .ok_or_else(|| ServerDomainError::invalid_configuration("port is missing"))?;
    if !matches!(url.path(), "" | "/") {
        return Err(ServerDomainError::invalid_configuration(format!(
            "unexpected path '{}'",
            url.path()
        )));
    }

    let (method, password) = match user_info.split_once(':') {
        Some((raw_method, raw_password)) => (
            decode_component(raw_method, "method")?,
            decode_component(raw_password, "password")?,
        ),
        None => decode_base64_credentials(&decode_component(user_info, "user info")?)?,
    };

    let mut config = ServiceConfig::new(host, port, method, password)?;
    for (name, value) in parse_query(query.unwrap_or_default())? {
        config = config.with_extra(name, value);
    }
    Ok(config)
}

/// Decodes `name=value` pairs strictly. Pairs with an empty name are skipped.
fn parse_query(query: &str) -> Result<Vec<(String, String)>, ServerDomainError> {
    let mut pairs = Vec::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(raw_name, "parameter name")?;
        if name.is_empty() {
            continue;
        }
        pairs.push((name, decode_component(raw_value, "parameter value")?));
    }
    Ok(pairs)
}

fn parse_legacy(location: &str) -> Result<ServiceConfig, ServerDomainError> {
    let encoded = location.trim_end_matches('/');
    let decoded = decode_base64_text(encoded, "legacy access key")?;
    let (user_info, host_port) = decoded.rsplit_once('@').ok_or_else(|| {
        ServerDomainError::invalid_configuration("legacy access key is missing a host")
    })?;
    let (method, password) = split_credentials(user_info)?;
    let (host, port) = split_host_port(host_port)?;
    ServiceConfig::new(host, port, method, password)
}

fn decode_base64_credentials(raw: &str) -> Result<(String, String), ServerDomainError> {
    let decoded = decode_base64_text(raw, "user info")?;
    split_credentials(&decoded)
}

fn decode_base64_text(raw: &str, field: &str) -> Result<String, ServerDomainError> {
    let unpadded = raw.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(unpadded)
        .or_else(|_| STANDARD_NO_PAD.decode(unpadded))
        .map_err(|_| ServerDomainError::invalid_configuration(format!("{field} is not base64")))?;
    String::from_utf8(bytes).map_err(|_| {
        ServerDomainError::invalid_configuration(format!("{field} is not valid UTF-8"))
    })
}

fn split_credentials(user_info: &str) -> Result<(String, String), ServerDomainError> {
    let (method, password) = user_info.split_once(':').ok_or_else(|| {
        ServerDomainError::invalid_configuration("user info must be 'method:password'")
    })?;
    Ok((method.to_owned(), password.to_owned()))
}

fn split_host_port(host_port: &str) -> Result<(String, u16), ServerDomainError> {
    let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or_else(|| ServerDomainError::invalid_configuration("unterminated IPv6 host"))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| ServerDomainError::invalid_configuration("port is missing"))?;
        (host, port)
    } else {
        host_port
            .rsplit_once(':')
            .ok_or_else(|| ServerDomainError::invalid_configuration("port is missing"))?
    };

    let port_number = port
        .parse::<u16>()
        .map_err(|_| ServerDomainError::invalid_configuration(format!("invalid port '{port}'")))?;
    Ok((host.to_owned(), port_number))
}

/// Percent-decodes a URI component, rejecting truncated or non-hex escapes.
fn decode_component(raw: &str, field: &str) -> Result<String, ServerDomainError> {
    let mut bytes = raw.bytes();
    while let Some(byte) = bytes.next() {
        if byte != b'%' {
            continue;
        }
        let is_valid_escape = matches!(
            (bytes.next(), bytes.next()),
            (Some(high), Some(low)) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit()
        );
        if !is_valid_escape {
            return Err(ServerDomainError::invalid_configuration(format!(
                "malformed percent-encoding in {field}"
            )));
        }
    }

    urlencoding::decode(raw).map(Cow::into_owned).map_err(|_| {
        ServerDomainError::invalid_configuration(format!("{field} is not valid UTF-8"))
    })
}
