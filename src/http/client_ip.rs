//! Caller identification honoring trusted proxies.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolve the client address for a request.
///
/// The peer socket address is authoritative unless the peer is a configured
/// trusted proxy. In that case the `X-Forwarded-For` chain is walked from
/// the right, skipping trusted proxies, and the first non-trusted hop wins.
/// A missing or unparseable header falls back to the peer address.
pub fn client_ip(peer: SocketAddr, headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> IpAddr {
    let peer_ip = peer.ip();
    if !trusted_proxies.contains(&peer_ip) {
        return peer_ip;
    }

    let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) else {
        return peer_ip;
    };

    let hops: Vec<IpAddr> = forwarded
        .split(',')
        .filter_map(|hop| hop.trim().parse().ok())
        .collect();

    for hop in hops.iter().rev() {
        if !trusted_proxies.contains(hop) {
            return *hop;
        }
    }

    // Every hop is a trusted proxy; the leftmost is the closest thing to
    // an originating client.
    hops.first().copied().unwrap_or(peer_ip)
}
