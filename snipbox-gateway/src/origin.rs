//! Client origin extraction for rate limiting.
//!
//! `X-Forwarded-For` is used verbatim. A header listing several hops
//! (`"1.1.1.1, 10.0.0.1"`) is one origin key, not split per address.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Origin key used when nothing identifies the client.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Resolve the origin key from proxy headers, falling back to the peer IP.
#[must_use]
pub fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    header_value(headers, FORWARDED_FOR)
        .or_else(|| header_value(headers, REAL_IP))
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_owned())
}

/// Origin key for an incoming request.
#[must_use]
pub fn request_origin<B>(request: &Request<B>) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_origin(request.headers(), peer)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([192, 0, 2, 7], 51234))
    }

    #[test]
    fn forwarded_for_is_taken_verbatim() {
        let h = headers(&[("x-forwarded-for", "203.0.113.5, 10.0.0.1"), ("x-real-ip", "10.9.9.9")]);
        assert_eq!(client_origin(&h, Some(peer())), "203.0.113.5, 10.0.0.1");
    }

    #[test]
    fn real_ip_used_without_forwarded_for() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_origin(&h, Some(peer())), "198.51.100.2");
    }

    #[test]
    fn blank_headers_fall_through_to_peer_ip() {
        let h = headers(&[("x-forwarded-for", "  "), ("x-real-ip", "")]);
        assert_eq!(
            client_origin(&h, Some(peer())),
            "192.0.2.7",
            "port must not be part of the key"
        );
    }

    #[test]
    fn unknown_when_nothing_identifies_client() {
        assert_eq!(client_origin(&HeaderMap::new(), None), UNKNOWN_ORIGIN);
    }

    #[test]
    fn request_origin_reads_connect_info() {
        let mut req = Request::new(());
        req.extensions_mut().insert(ConnectInfo(peer()));
        assert_eq!(request_origin(&req), "192.0.2.7");
    }
}
