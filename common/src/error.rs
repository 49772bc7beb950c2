use std::net::{AddrParseError, Ipv4Addr};
use std::num::ParseIntError;

use thiserror::Error;

/// A range specification that could not be resolved into addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid range '{input}': {kind}")]
pub struct InvalidRangeError {
    /// The offending text, exactly as supplied.
    pub input: String,
    #[source]
    pub kind: RangeErrorKind,
}

impl InvalidRangeError {
    pub fn new(input: impl Into<String>, kind: RangeErrorKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }
}

/// Why a range specification was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeErrorKind {
    #[error("range specification is empty")]
    Empty,

    #[error("invalid address '{text}': {source}")]
    InvalidAddress {
        text: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid prefix '{text}': {source}")]
    InvalidPrefix {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("netmask {0} is not contiguous")]
    InvalidNetmask(Ipv4Addr),

    #[error("prefix length {0} exceeds 32")]
    PrefixTooLong(u8),

    #[error("invalid range end '{text}': {reason}")]
    InvalidRangeEnd { text: String, reason: String },

    #[error("range start {start} is after range end {end}")]
    Reversed { start: Ipv4Addr, end: Ipv4Addr },

    #[error("IPv6 ranges are not supported: {0}")]
    Ipv6Unsupported(String),
}
