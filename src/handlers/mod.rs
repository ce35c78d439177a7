//! HTTP handlers for the login gate and the console endpoints.

pub mod console;
pub mod login;

use actix_web::HttpRequest;
use std::net::Ipv4Addr;

/// Client address for ticket signing.
///
/// Tickets bind the client's IPv4 address into their digest. Behind a proxy
/// that does not forward the original address (or with `ignore_client_ip`
/// set), everything signs as 0.0.0.0, matching how the front-end ticket
/// checker is configured in those deployments.
pub fn client_ip(req: &HttpRequest, ignore_client_ip: bool) -> Ipv4Addr {
    if ignore_client_ip {
        return Ipv4Addr::UNSPECIFIED;
    }
    req.peer_addr()
        .map(|addr| match addr.ip() {
            std::net::IpAddr::V4(ip) => ip,
            std::net::IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        })
        .unwrap_or(Ipv4Addr::UNSPECIFIED)
}
