//! Page URL admission checks.

use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlRejected {
    #[error("invalid URL: {0}")]
    Parse(String),
    #[error("unsupported URL scheme '{0}' (only http and https are allowed)")]
    Scheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URL points at a local or private network address")]
    PrivateHost,
}

/// Parses and checks a user-supplied page URL.
///
/// Only http/https with a host are accepted. Unless `allow_private` is set,
/// loopback, private, link-local and unique-local addresses and `localhost`
/// are refused.
pub fn validate_page_url(raw: &str, allow_private: bool) -> Result<Url, UrlRejected> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlRejected::Parse(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlRejected::Scheme(other.to_string())),
    }
    let host = url.host().ok_or(UrlRejected::MissingHost)?;
    if allow_private {
        return Ok(url);
    }
    let private = match host {
        Host::Domain(d) => {
            let d = d.to_ascii_lowercase();
            d == "localhost" || d.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_ip(IpAddr::V4(ip)),
        Host::Ipv6(ip) => is_private_ip(IpAddr::V6(ip)),
    };
    if private {
        return Err(UrlRejected::PrivateHost);
    }
    Ok(url)
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
    }
}
