//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use crate::domain::errors::ParseError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A parsed IPv4 or IPv6 address.
///
/// Equality and hashing work on the binary form, so textual variants of
/// the same address (`2001:0DB8::1` and `2001:db8::1`) are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalAddress(IpAddr);

impl CanonicalAddress {
    /// Parse a textual address.
    ///
    /// Accepts dotted-decimal IPv4 and colon-hex IPv6. Surrounding
    /// whitespace, zone identifiers and prefix lengths are rejected.
    ///
    /// # Examples
    /// ```
    /// use geolocate_ip::domain::value_objects::CanonicalAddress;
    ///
    /// let a = CanonicalAddress::parse("2001:0DB8::0001").unwrap();
    /// let b = CanonicalAddress::parse("2001:db8::1").unwrap();
    /// assert_eq!(a, b);
    /// assert!(CanonicalAddress::parse("not-an-ip").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        text.parse::<IpAddr>()
            .map(Self)
            .map_err(|_| ParseError::Malformed(text.to_string()))
    }

    /// The underlying address.
    pub fn ip(&self) -> IpAddr {
        self.0
    }

    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }
}

impl FromStr for CanonicalAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<IpAddr> for CanonicalAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

/// Renders the canonical text form (lowercase, compressed IPv6).
impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
