//! Client IP resolution from proxy headers
//!
//! The service runs behind a reverse proxy, so the peer address is the
//! proxy's. The original client is carried in `x-forwarded-for` (first
//! entry) or `x-real-ip`.

use axum::http::HeaderMap;

/// Fallback when no forwarding header is present
pub const UNKNOWN_IP: &str = "unknown";

/// Resolve the client IP string used for rate limiting.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    UNKNOWN_IP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn forwarded_for_beats_real_ip() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn real_ip_used_as_fallback() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip(&h), "198.51.100.2");
    }

    #[test]
    fn no_headers_yields_unknown() {
        let h = HeaderMap::new();
        assert_eq!(client_ip(&h), UNKNOWN_IP);
    }

    #[test]
    fn empty_forwarded_falls_through() {
        let h = headers(&[("x-forwarded-for", ""), ("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip(&h), "198.51.100.2");
    }
}
