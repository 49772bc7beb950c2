//! # IPv4 Range Model
//!
//! Provides the resolved, immutable set of addresses a sweep will probe.
//!
//! An [`AddressRange`] is stored as sorted, merged, non-overlapping
//! [`Ipv4Range`] blocks, so even a `/8` stays two words per block and is only
//! expanded lazily through [`AddressRange::iter`].

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::{InvalidRangeError, RangeErrorKind};
use crate::network::target;

/// Prefix lengths above this value have no network/broadcast address to strip.
pub const MAX_RESERVING_PREFIX: u8 = 30;

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn single(addr: Ipv4Addr) -> Self {
        Self::new(addr, addr)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone + use<> {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses in the range, `0` when start is after end.
    pub fn len(&self) -> u64 {
        let start = u64::from(u32::from(self.start_addr));
        let end = u64::from(u32::from(self.end_addr));
        if end < start { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.start_addr <= addr && addr <= self.end_addr
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_addr == self.end_addr {
            write!(f, "{}", self.start_addr)
        } else {
            write!(f, "{}-{}", self.start_addr, self.end_addr)
        }
    }
}

/// Creates the range covering the entire network block of `ip/prefix`.
///
/// Host bits in `ip` are masked off.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, RangeErrorKind> {
    let network = Ipv4Network::new(ip, prefix)
        .map_err(|_| RangeErrorKind::PrefixTooLong(prefix))?;
    // `Ipv4Network::new` keeps the host bits; `network()` masks them.
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Creates the range of *usable* host addresses in `ip/prefix`.
///
/// Blocks with a prefix of at most [`MAX_RESERVING_PREFIX`] lose their network
/// and broadcast addresses. Point-to-point (`/31`) and single-host (`/32`)
/// blocks keep every address.
pub fn cidr_hosts(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, RangeErrorKind> {
    let block = cidr_range(ip, prefix)?;
    if prefix > MAX_RESERVING_PREFIX {
        return Ok(block);
    }

    let start = u32::from(block.start_addr) + 1;
    let end = u32::from(block.end_addr) - 1;
    Ok(Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)))
}

/// An ordered, deduplicated set of IPv4 host addresses resolved from a
/// range specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRange {
    blocks: Vec<Ipv4Range>,
}

impl AddressRange {
    /// Parses a range specification. See [`expand`].
    pub fn parse(spec: &str) -> Result<Self, InvalidRangeError> {
        target::parse_spec(spec)
            .map(Self::from_blocks)
            .map_err(|kind| InvalidRangeError::new(spec, kind))
    }

    /// Builds a range from arbitrary blocks, sorting and merging overlapping
    /// or adjacent ones. Reversed blocks are dropped.
    pub fn from_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = Ipv4Range>,
    {
        let mut sorted: Vec<Ipv4Range> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
        sorted.sort_by_key(|b| b.start_addr);

        let mut merged: Vec<Ipv4Range> = Vec::with_capacity(sorted.len());
        for block in sorted {
            match merged.last_mut() {
                Some(last) if u64::from(u32::from(block.start_addr))
                    <= u64::from(u32::from(last.end_addr)) + 1 =>
                {
                    if block.end_addr > last.end_addr {
                        last.end_addr = block.end_addr;
                    }
                }
                _ => merged.push(block),
            }
        }

        Self { blocks: merged }
    }

    /// Total number of addresses.
    pub fn len(&self) -> u64 {
        self.blocks.iter().map(Ipv4Range::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Addresses in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + Clone + '_ {
        self.blocks.iter().flat_map(Ipv4Range::iter)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.blocks.iter().any(|b| b.contains(addr))
    }

    pub fn blocks(&self) -> &[Ipv4Range] {
        &self.blocks
    }

    pub fn first(&self) -> Option<Ipv4Addr> {
        self.blocks.first().map(|b| b.start_addr)
    }

    pub fn last(&self) -> Option<Ipv4Addr> {
        self.blocks.last().map(|b| b.end_addr)
    }
}

impl FromStr for AddressRange {
    type Err = InvalidRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, block) in self.blocks.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

/// Expands a range specification into its usable host addresses.
///
/// Supported formats:
/// * **Host**: `"192.168.1.5"`.
/// * **CIDR**: `"192.168.1.0/24"`, network and broadcast excluded up to `/30`.
/// * **Range**: `"192.168.1.1-50"` or `"192.168.1.1-192.168.1.50"`.
/// * **List**: any of the above separated by commas.
pub fn expand(spec: &str) -> Result<AddressRange, InvalidRangeError> {
    AddressRange::parse(spec)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
