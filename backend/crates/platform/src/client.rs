//! Client identification utilities
//!
//! Derives the per-caller identity the rate limiter is keyed on.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Identity used when neither headers nor the socket reveal an address
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Whether `X-Forwarded-For` may be used to identify a client
///
/// Only enable `TrustProxy` when every connection arrives through a reverse
/// proxy that appends the peer it saw; otherwise callers can pick their own
/// identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForwardedPolicy {
    /// Key on the socket peer only
    #[default]
    Ignore,
    /// Key on the hop appended by the proxy in front of us
    TrustProxy,
}

/// Extract client IP address
///
/// With [`ForwardedPolicy::TrustProxy`] the right-most `X-Forwarded-For`
/// entry is used: it is the one our proxy appended, while entries to its
/// left came from the caller. Falls back to the direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
/// * `policy` - Whether forwarded headers are trusted
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    policy: ForwardedPolicy,
) -> Option<IpAddr> {
    if policy == ForwardedPolicy::TrustProxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| xff.rsplit(',').next())
            .and_then(|last| last.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    direct_ip
}

/// Stable rate-limit identity for a request
///
/// The port is not part of the identity: every new connection from the same
/// host gets a fresh ephemeral port.
pub fn client_identity(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    policy: ForwardedPolicy,
) -> String {
    extract_client_ip(headers, direct_ip, policy)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
