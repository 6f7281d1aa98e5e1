// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identity resolution behind a local reverse proxy.
//!
//! `X-Forwarded-For` is only honoured when the TCP peer is itself on a
//! loopback or private network, i.e. a proxy on the same host or VM network.
//! The client is the rightmost forwarded address outside those ranges.

use axum::http::HeaderMap;
use dchook_common::ClientIdentity;
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the identity used for abuse control.
pub fn resolve_identity(peer: SocketAddr, headers: &HeaderMap) -> ClientIdentity {
    let peer_ip = peer.ip().to_canonical();
    if !is_trusted_proxy(peer_ip) {
        return ClientIdentity::from(peer_ip);
    }

    match forwarded_client(headers) {
        Some(ip) => ClientIdentity::from(ip),
        None => ClientIdentity::from(peer_ip),
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<IpAddr> {
    let mut hops = Vec::new();
    for value in headers.get_all(FORWARDED_FOR) {
        let value = match value.to_str() {
            Ok(v) => v,
            Err(_) => {
                debug!("Non-ASCII X-Forwarded-For, using peer address");
                return None;
            }
        };
        hops.extend(value.split(',').map(str::trim).filter(|h| !h.is_empty()));
    }

    for hop in hops.into_iter().rev() {
        let ip = match parse_hop(hop) {
            Some(ip) => ip.to_canonical(),
            None => {
                debug!(hop, "Unparseable X-Forwarded-For hop, using peer address");
                return None;
            }
        };
        if !is_trusted_proxy(ip) {
            return Some(ip);
        }
    }
    None
}

fn parse_hop(hop: &str) -> Option<IpAddr> {
    hop.parse::<IpAddr>()
        .ok()
        .or_else(|| hop.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

fn is_trusted_proxy(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
        }
    }
}
