//! Client identity resolution from proxy headers.

use axum::http::HeaderMap;

/// Address reported when no proxy header identifies the client.
pub const FALLBACK_ADDR: &str = "127.0.0.1";

/// Resolve a best-effort client address from proxy headers.
///
/// Headers are consulted in trust order: the connecting proxy's asserted IP
/// first, then the real-IP header, then the first entry of a forwarded-for
/// chain. Values are taken as-is with no syntax validation; when nothing
/// matches, the loopback literal is returned.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = header_value(headers, "cf-connecting-ip") {
        return ip.to_string();
    }
    if let Some(ip) = header_value(headers, "x-real-ip") {
        return ip.to_string();
    }
    if let Some(forwarded) = header_value(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    FALLBACK_ADDR.to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_connecting_proxy_header_wins() {
        let headers = headers(&[
            ("cf-connecting-ip", "10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
            ("x-forwarded-for", "10.0.0.3, 10.0.0.4"),
        ]);
        assert_eq!(client_ip(&headers), "10.0.0.1");
    }

    #[test]
    fn test_real_ip_beats_forwarded_for() {
        let headers = headers(&[
            ("x-real-ip", "10.0.0.2"),
            ("x-forwarded-for", "10.0.0.3, 10.0.0.4"),
        ]);
        assert_eq!(client_ip(&headers), "10.0.0.2");
    }

    #[test]
    fn test_forwarded_for_takes_first_entry_trimmed() {
        let headers = headers(&[("x-forwarded-for", "1.2.3.4, 5.6.6.7")]);
        assert_eq!(client_ip(&headers), "1.2.3.4");
    }

    #[test]
    fn test_no_headers_falls_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn test_empty_header_values_are_skipped() {
        let headers = headers(&[("cf-connecting-ip", ""), ("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_ip(&headers), "10.0.0.2");
    }

    #[test]
    fn test_values_are_not_validated() {
        let headers = headers(&[("x-real-ip", "definitely-not-an-ip")]);
        assert_eq!(client_ip(&headers), "definitely-not-an-ip");
    }
}
