//! Best-effort originating address for a request.
//!
//! Order: first non-blank hop of `X-Forwarded-For`, then the transport peer
//! address, then the literal `"unknown"`.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use canary_core::event::MAX_IP_ADDRESS_LEN;
use std::convert::Infallible;
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const UNKNOWN_CLIENT: &str = "unknown";

pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    let addr = match (forwarded, peer) {
        (Some(hop), _) => hop.to_string(),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    };

    addr.chars().take(MAX_IP_ADDRESS_LEN).collect()
}

pub fn peer_addr(extensions: &axum::http::Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Extractor form of [`client_ip`]. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientAddr(client_ip(&parts.headers, peer_addr(&parts.extensions))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51234".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.7");
    }

    #[test]
    fn test_blank_forwarded_for_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("  , 10.0.0.1"));
        assert_eq!(client_ip(&headers, peer()), "192.0.2.10");
    }

    #[test]
    fn test_peer_address_without_header() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "192.0.2.10");
    }

    #[test]
    fn test_unknown_without_any_source() {
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_oversized_header_is_capped() {
        let mut headers = HeaderMap::new();
        let long = "a".repeat(MAX_IP_ADDRESS_LEN * 2);
        headers.insert(FORWARDED_FOR, HeaderValue::from_str(&long).unwrap());
        assert_eq!(client_ip(&headers, None).len(), MAX_IP_ADDRESS_LEN);
    }
}
