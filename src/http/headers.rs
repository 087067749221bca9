//! Response header helpers.
//!
//! # Design Decisions
//! - Header values are sent as ISO-8859-1 octets; text outside that range
//!   (or containing control characters) cannot be carried by the transport
//!   and is rejected here

#![allow(clippy::declare_interior_mutable_const, clippy::borrow_interior_mutable_const)]

use axum::http::{HeaderName, HeaderValue};

pub const REDIRECT_SERVER_HOST: HeaderName = HeaderName::from_static("redirect-server-host");
pub const REDIRECT_SERVER_VERSION: HeaderName =
    HeaderName::from_static("redirect-server-version");
pub const REDIRECT_CREATED_BY: HeaderName = HeaderName::from_static("redirect-created-by");
pub const REDIRECT_CREATED_DATE: HeaderName = HeaderName::from_static("redirect-created-date");

/// Value sent in `Redirect-Created-By` when the recorded user cannot be encoded.
pub const CREATED_BY_FALLBACK: &str = "Error Encoding User";

/// Encode `text` as an ISO-8859-1 header value, if representable.
pub fn latin1_header_value(text: &str) -> Option<HeaderValue> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    HeaderValue::from_bytes(&bytes).ok()
}

/// True when `text` can be sent as a header value.
pub fn is_header_safe(text: &str) -> bool {
    latin1_header_value(text).is_some()
}

/// Name of this host, for `Redirect-Server-Host`.
pub fn server_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::env::var("COMPUTERNAME").ok())
        .or_else(|| std::fs::read_to_string("/proc/sys/kernel/hostname").ok())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty() && is_header_safe(h))
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_are_safe() {
        assert!(is_header_safe("http://example.com/a?b=c"));
        assert_eq!(
            latin1_header_value("caf\u{e9}").unwrap().as_bytes(),
            &[b'c', b'a', b'f', 0xE9]
        );
    }

    #[test]
    fn wide_characters_and_controls_are_rejected() {
        assert!(!is_header_safe("\u{6df7}\u{6c8c}"));
        assert!(!is_header_safe("line\nbreak"));
    }

    #[test]
    fn hostname_is_never_empty() {
        assert!(!server_hostname().is_empty());
    }
}
