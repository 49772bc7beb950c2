//! # Range Specification Parsing
//!
//! Turns the text a user types into address blocks.
//!
//! A specification is one or more comma-separated parts, each of which can be:
//! * A single IPv4 address (host).
//! * An IPv4 range (e.g., `192.168.1.1-100`).
//! * A CIDR block (e.g., `192.168.1.0/24` or `192.168.1.0/255.255.255.0`).

use std::net::{IpAddr, Ipv4Addr};

use pnet::ipnetwork::ipv4_mask_to_prefix;

use crate::error::RangeErrorKind;
use crate::network::range::{self, Ipv4Range};

/// Parses every part of `spec` into a block. Fails on the first bad part.
pub(crate) fn parse_spec(spec: &str) -> Result<Vec<Ipv4Range>, RangeErrorKind> {
    let parts: Vec<&str> = spec
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(RangeErrorKind::Empty);
    }

    parts.into_iter().map(parse_part).collect()
}

fn parse_part(s: &str) -> Result<Ipv4Range, RangeErrorKind> {
    if let Some((ip_str, prefix_str)) = s.split_once('/') {
        return parse_cidr_range(ip_str, prefix_str);
    }

    if let Some(addr) = parse_host(s)? {
        return Ok(Ipv4Range::single(addr));
    }

    if let Some((start_str, end_str)) = s.split_once('-') {
        return parse_ip_range(start_str, end_str);
    }

    Err(invalid_address(s))
}

/// Parses a single address. `Ok(None)` means "not an address at all".
fn parse_host(s: &str) -> Result<Option<Ipv4Addr>, RangeErrorKind> {
    match s.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => Ok(Some(addr)),
        Ok(IpAddr::V6(_)) => Err(RangeErrorKind::Ipv6Unsupported(s.to_string())),
        Err(_) => Ok(None),
    }
}

/// Parses CIDR notation like "192.168.1.0/24" or "192.168.1.0/255.255.255.0".
fn parse_cidr_range(ip_str: &str, prefix_str: &str) -> Result<Ipv4Range, RangeErrorKind> {
    let ip_str = ip_str.trim();
    if ip_str.contains(':') && ip_str.parse::<IpAddr>().is_ok() {
        return Err(RangeErrorKind::Ipv6Unsupported(format!("{ip_str}/{prefix_str}")));
    }

    let ipv4_addr = parse_ipv4(ip_str)?;

    let prefix_str = prefix_str.trim();
    let prefix = if prefix_str.contains('.') {
        let mask = parse_ipv4(prefix_str)?;
        ipv4_mask_to_prefix(mask).map_err(|_| RangeErrorKind::InvalidNetmask(mask))?
    } else {
        prefix_str
            .parse::<u8>()
            .map_err(|source| RangeErrorKind::InvalidPrefix {
                text: prefix_str.to_string(),
                source,
            })?
    };

    range::cidr_hosts(ipv4_addr, prefix)
}

/// Parses a range like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(start_str: &str, end_str: &str) -> Result<Ipv4Range, RangeErrorKind> {
    let start_addr = parse_ipv4(start_str.trim())?;
    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr)?;

    if end_addr < start_addr {
        return Err(RangeErrorKind::Reversed {
            start: start_addr,
            end: end_addr,
        });
    }

    Ok(Ipv4Range::new(start_addr, end_addr))
}

/// Parses the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, RangeErrorKind> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    let invalid_end = |reason: String| RangeErrorKind::InvalidRangeEnd {
        text: end_str.to_string(),
        reason,
    };

    if end_str.is_empty() {
        return Err(invalid_end("end cannot be empty".to_string()));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| invalid_end(e.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(invalid_end("too many octets".to_string()));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

fn parse_ipv4(s: &str) -> Result<Ipv4Addr, RangeErrorKind> {
    s.parse::<Ipv4Addr>().map_err(|_| invalid_address(s))
}

fn invalid_address(s: &str) -> RangeErrorKind {
    // Re-parse as `IpAddr` only to obtain the std parse error.
    match s.parse::<IpAddr>() {
        Err(source) => RangeErrorKind::InvalidAddress {
            text: s.to_string(),
            source,
        },
        Ok(_) => RangeErrorKind::Ipv6Unsupported(s.to_string()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
